use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::write::{new_transaction_id, resolve, Write};
use super::{ContentStore, StoreError, StoreResult};
use crate::mutation::{Mutation, MutationResponse};
use crate::query::{Params, Query};

/// Documents kept in a PostgreSQL `documents` table, one row per revision
/// slot (`{id}` and `drafts.{id}` are separate rows).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded pool and apply pending migrations.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(database_url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        tracing::info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn fetch(&self, query: &Query, params: &Params) -> StoreResult<Vec<Value>> {
        // Narrow by type in SQL; the remaining filter runs in memory.
        let rows: Vec<Json<Value>> = match &query.doc_type {
            Some(doc_type) => {
                sqlx::query_scalar("SELECT content FROM documents WHERE doc_type = $1")
                    .bind(doc_type)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT content FROM documents")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        let docs: Vec<Value> = rows.into_iter().map(|Json(doc)| doc).collect();
        Ok(query.run(&docs, params))
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT content FROM documents WHERE document_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn mutate(&self, mutations: Vec<Mutation>) -> StoreResult<MutationResponse> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut results = Vec::with_capacity(mutations.len());

        for mut mutation in mutations {
            mutation.ensure_id();
            let id = mutation.document_id().unwrap_or_default().to_string();
            let existing: Option<Json<Value>> = sqlx::query_scalar(
                "SELECT content FROM documents WHERE document_id = $1 FOR UPDATE",
            )
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?;
            let existing = existing.map(|Json(doc)| doc);

            let write = resolve(&mutation, existing.as_ref(), now)?;
            results.push(write.result(existing.is_none()));
            match write {
                Write::Put { id, doc } => {
                    let doc_type = doc
                        .get("_type")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    sqlx::query(
                        "INSERT INTO documents (document_id, doc_type, content, updated_at) \
                         VALUES ($1, $2, $3, now()) \
                         ON CONFLICT (document_id) DO UPDATE \
                         SET doc_type = EXCLUDED.doc_type, content = EXCLUDED.content, updated_at = now()",
                    )
                    .bind(&id)
                    .bind(&doc_type)
                    .bind(Json(&doc))
                    .execute(&mut *tx)
                    .await?;
                }
                Write::Remove { id } => {
                    sqlx::query("DELETE FROM documents WHERE document_id = $1")
                        .bind(&id)
                        .execute(&mut *tx)
                        .await?;
                }
                Write::Noop { .. } => {}
            }
        }

        tx.commit().await?;
        let transaction_id = new_transaction_id();
        tracing::debug!(%transaction_id, writes = results.len(), "postgres store committed");
        Ok(MutationResponse {
            transaction_id,
            results,
        })
    }

    async fn health(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
