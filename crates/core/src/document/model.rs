use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields owned by the content store rather than by editors.
pub const SYSTEM_FIELDS: [&str; 5] = ["_id", "_type", "_rev", "_createdAt", "_updatedAt"];

/// A content document as held by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub _id: String,
    pub _type: String,
    #[serde(default)]
    pub _rev: String,
    #[serde(rename = "_createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Arbitrary type-specific fields.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Document {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        // Serializing a struct of strings, dates and a JSON map cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.content.get(name).and_then(Value::as_str)
    }

    /// `slug.current`, if set and non-empty.
    pub fn slug(&self) -> Option<&str> {
        self.content
            .get("slug")
            .and_then(|s| s.get("current"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_archived(&self) -> bool {
        self.content
            .get("isArchived")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Editor-owned fields only; what two revisions are compared on.
    pub fn editable_fields(&self) -> &Map<String, Value> {
        &self.content
    }
}

/// Strip system fields from a raw document value, keeping editor content.
pub fn without_system_fields(value: &Value) -> Map<String, Value> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(k, _)| !SYSTEM_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_content_fields() {
        let doc = Document::from_value(json!({
            "_id": "post-1",
            "_type": "newsPost",
            "_rev": "r1",
            "_createdAt": "2024-05-01T10:00:00Z",
            "_updatedAt": "2024-05-01T10:00:00Z",
            "title": "Straatfeest",
            "slug": {"_type": "slug", "current": "straatfeest"},
        }))
        .unwrap();
        assert_eq!(doc.str_field("title"), Some("Straatfeest"));
        assert_eq!(doc.slug(), Some("straatfeest"));
        assert!(!doc.is_archived());
        assert!(!doc.content.contains_key("_id"));
    }

    #[test]
    fn empty_slug_is_absent() {
        let doc = Document::from_value(json!({
            "_id": "a", "_type": "newsPost", "slug": {"current": ""}
        }))
        .unwrap();
        assert_eq!(doc.slug(), None);
    }

    #[test]
    fn strips_system_fields() {
        let map = without_system_fields(&json!({"_id": "x", "_rev": "1", "title": "T"}));
        assert_eq!(map.len(), 1);
        assert_eq!(map["title"], json!("T"));
    }
}
