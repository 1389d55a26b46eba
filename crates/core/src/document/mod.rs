pub mod id;
pub mod model;
pub mod slug;
pub mod validate;

pub use id::{draft_id, is_draft_id, DocumentIdKind};
pub use model::{without_system_fields, Document, SYSTEM_FIELDS};
pub use slug::slugify;
