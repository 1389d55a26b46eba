use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use super::write::{new_transaction_id, resolve, Write};
use super::{ContentStore, StoreResult};
use crate::mutation::{Mutation, MutationResponse};
use crate::query::{Params, Query};

/// In-process document store. Each mutation batch is applied to a copy and
/// swapped in whole, so a failing mutation leaves the store untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with documents (each needs `_id` and `_type`).
    pub async fn seeded(docs: impl IntoIterator<Item = Value>) -> StoreResult<Self> {
        let store = Self::new();
        let batch = docs.into_iter().map(Mutation::CreateOrReplace).collect();
        store.mutate(batch).await?;
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, query: &Query, params: &Params) -> StoreResult<Vec<Value>> {
        let docs = self.docs.read().await;
        Ok(query.run(docs.values(), params))
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn mutate(&self, mutations: Vec<Mutation>) -> StoreResult<MutationResponse> {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let now = Utc::now();
        let mut results = Vec::with_capacity(mutations.len());

        for mut mutation in mutations {
            mutation.ensure_id();
            let id = mutation.document_id().unwrap_or_default().to_string();
            let write = resolve(&mutation, next.get(&id), now)?;
            let created = !next.contains_key(&id);
            results.push(write.result(created));
            match write {
                Write::Put { id, doc } => {
                    next.insert(id, doc);
                }
                Write::Remove { id } => {
                    next.remove(&id);
                }
                Write::Noop { .. } => {}
            }
        }

        *docs = next;
        let transaction_id = new_transaction_id();
        tracing::debug!(%transaction_id, writes = results.len(), "memory store committed");
        Ok(MutationResponse {
            transaction_id,
            results,
        })
    }

    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }
}
