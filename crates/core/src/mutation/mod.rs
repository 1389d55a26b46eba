pub mod apply;
pub mod types;

pub use apply::{apply_patch, PatchError};
pub use types::{
    DeleteMutation, Mutation, MutationResponse, MutationResult, PatchMutation, PatchOperations,
};
