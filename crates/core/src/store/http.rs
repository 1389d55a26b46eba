use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ContentStore, StoreError, StoreResult};
use crate::mutation::{Mutation, MutationResponse};
use crate::query::{Params, Query};

/// Connection settings for a hosted, Sanity-compatible content API.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Required for drafts and writes; public reads work without it.
    pub token: Option<String>,
}

impl HttpStoreConfig {
    fn base_url(&self) -> String {
        format!(
            "https://{}.api.sanity.io/v{}",
            self.project_id, self.api_version
        )
    }
}

/// Content store backed by the hosted content API over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
    base_url: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct DocResponse {
    #[serde(default)]
    documents: Vec<Value>,
}

impl HttpStore {
    pub fn new(config: HttpStoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: HttpStoreConfig) -> Self {
        let base_url = config.base_url();
        Self {
            client,
            config,
            base_url,
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Upstream(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => StoreError::NotFound(body),
                StatusCode::CONFLICT => StoreError::AlreadyExists(body),
                _ => StoreError::Upstream(format!("{status}: {body}")),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Upstream(e.to_string()))
    }
}

/// Query-string pairs for a query: the GROQ text, perspective and `$params`
/// encoded as JSON.
pub(crate) fn query_pairs(query: &Query, params: &Params) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("query".to_string(), query.to_groq()),
        ("perspective".to_string(), query.perspective.as_str().to_string()),
    ];
    for (name, value) in params {
        pairs.push((format!("${name}"), value.to_string()));
    }
    pairs
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn fetch(&self, query: &Query, params: &Params) -> StoreResult<Vec<Value>> {
        let url = format!("{}/data/query/{}", self.base_url, self.config.dataset);
        let request = self.client.get(url).query(&query_pairs(query, params));
        let response: QueryResponse = self.send(request).await?;
        Ok(match response.result {
            Value::Array(docs) => docs,
            Value::Null => Vec::new(),
            single => vec![single],
        })
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
        let url = format!("{}/data/doc/{}/{id}", self.base_url, self.config.dataset);
        let response: DocResponse = self.send(self.client.get(url)).await?;
        Ok(response.documents.into_iter().next())
    }

    async fn mutate(&self, mutations: Vec<Mutation>) -> StoreResult<MutationResponse> {
        let url = format!(
            "{}/data/mutate/{}?returnIds=true",
            self.base_url, self.config.dataset
        );
        let request = self.client.post(url).json(&json!({ "mutations": mutations }));
        self.send(request).await
    }

    async fn health(&self) -> StoreResult<()> {
        let url = format!("{}/data/query/{}", self.base_url, self.config.dataset);
        let request = self.client.get(url).query(&[("query", "now()")]);
        let _: QueryResponse = self.send(request).await?;
        Ok(())
    }
}
