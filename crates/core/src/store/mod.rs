//! The content store port: the only shared mutable resource of the site.
//!
//! Site code reads and writes through [`ContentStore`]; backends decide
//! where documents live.

pub mod http;
pub mod memory;
pub mod postgres;
mod write;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::document::validate::ValidationError;
use crate::mutation::{Mutation, MutationResponse, PatchError, PatchOperations};
use crate::query::{Params, Query};

pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("revision mismatch on {id}: expected {expected}")]
    RevisionConflict { id: String, expected: String },

    #[error("invalid document: {0}")]
    Invalid(#[from] ValidationError),

    #[error("invalid patch: {0}")]
    Patch(#[from] PatchError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("upstream error: {0}")]
    Upstream(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a query, returning matching documents in query order.
    async fn fetch(&self, query: &Query, params: &Params) -> StoreResult<Vec<Value>>;

    /// Load one document by its full id (`drafts.` prefix included).
    async fn get(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Apply a batch of mutations atomically.
    async fn mutate(&self, mutations: Vec<Mutation>) -> StoreResult<MutationResponse>;

    /// Cheap connectivity check.
    async fn health(&self) -> StoreResult<()>;

    async fn fetch_first(&self, query: &Query, params: &Params) -> StoreResult<Option<Value>> {
        let query = query.clone().limit(1);
        Ok(self.fetch(&query, params).await?.into_iter().next())
    }

    async fn create(&self, doc: Value) -> StoreResult<MutationResponse> {
        self.mutate(vec![Mutation::Create(doc)]).await
    }

    async fn create_or_replace(&self, doc: Value) -> StoreResult<MutationResponse> {
        self.mutate(vec![Mutation::CreateOrReplace(doc)]).await
    }

    async fn patch(&self, id: &str, operations: PatchOperations) -> StoreResult<MutationResponse> {
        self.mutate(vec![Mutation::patch(id, operations)]).await
    }

    async fn delete(&self, id: &str) -> StoreResult<MutationResponse> {
        self.mutate(vec![Mutation::delete(id)]).await
    }
}
