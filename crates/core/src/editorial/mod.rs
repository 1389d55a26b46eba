//! Editorial action set: the per-document state machine behind the
//! studio's toolbar.

pub mod actions;
pub mod editor;
pub mod state;
pub mod studio;

pub use actions::{disabled_reason, offers, toolbar, DisabledReason, EditorialAction};
pub use editor::{
    ConfirmedDelete, DeleteRequest, DocumentForm, DocumentSummary, Editor, EditorialError,
    EditorialResult, SlugPoll, Transition,
};
pub use state::{DocumentPair, DocumentState};
pub use studio::{content_type, ContentType, CONTENT_TYPES};
