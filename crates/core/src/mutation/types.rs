/// Mutation types matching the hosted content API's mutation protocol.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Value),
    CreateOrReplace(Value),
    CreateIfNotExists(Value),
    Delete(DeleteMutation),
    Patch(PatchMutation),
}

impl Mutation {
    pub fn delete(id: impl Into<String>) -> Self {
        Mutation::Delete(DeleteMutation { id: id.into() })
    }

    pub fn patch(id: impl Into<String>, operations: PatchOperations) -> Self {
        Mutation::Patch(PatchMutation {
            id: id.into(),
            if_revision_id: None,
            operations,
        })
    }

    /// The id of the document this mutation writes, if known.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            Mutation::Create(doc)
            | Mutation::CreateOrReplace(doc)
            | Mutation::CreateIfNotExists(doc) => doc.get("_id").and_then(Value::as_str),
            Mutation::Delete(m) => Some(&m.id),
            Mutation::Patch(m) => Some(&m.id),
        }
    }

    /// Give create-style mutations without an `_id` a fresh one.
    pub fn ensure_id(&mut self) {
        if let Mutation::Create(doc)
        | Mutation::CreateOrReplace(doc)
        | Mutation::CreateIfNotExists(doc) = self
        {
            if let Value::Object(map) = doc {
                if !map.contains_key("_id") {
                    map.insert(
                        "_id".to_string(),
                        Value::String(uuid::Uuid::new_v4().to_string()),
                    );
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMutation {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMutation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_revision_id: Option<String>,
    #[serde(flatten)]
    pub operations: PatchOperations,
}

/// Field-level patch operations. Keys are dotted paths (`seo.title`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOperations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_if_missing: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unset: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inc: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dec: Option<Map<String, Value>>,
}

impl PatchOperations {
    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set
            .get_or_insert_with(Map::new)
            .insert(path.into(), value);
        self
    }

    pub fn set_if_missing(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set_if_missing
            .get_or_insert_with(Map::new)
            .insert(path.into(), value);
        self
    }

    pub fn unset(mut self, path: impl Into<String>) -> Self {
        self.unset.get_or_insert_with(Vec::new).push(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.as_ref().is_none_or(Map::is_empty)
            && self.set_if_missing.as_ref().is_none_or(Map::is_empty)
            && self.unset.as_ref().is_none_or(Vec::is_empty)
            && self.inc.as_ref().is_none_or(Map::is_empty)
            && self.dec.as_ref().is_none_or(Map::is_empty)
    }
}

/// Result of a mutation transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub transaction_id: String,
    pub results: Vec<MutationResult>,
}

impl MutationResponse {
    pub fn first_id(&self) -> Option<&str> {
        self.results.first().map(|r| r.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    pub id: String,
    pub operation: String,
}
