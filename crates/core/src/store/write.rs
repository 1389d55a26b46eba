// Resolution of a single mutation against the current stored revision.
// Shared by the backends that hold documents themselves.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::document::validate::validate_document;
use crate::mutation::{apply_patch, Mutation, MutationResult};

/// What a backend must do to its storage for one mutation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Write {
    Put { id: String, doc: Value },
    Remove { id: String },
    Noop { id: String },
}

impl Write {
    pub(crate) fn result(&self, created: bool) -> MutationResult {
        let (id, operation) = match self {
            Write::Put { id, .. } if created => (id, "create"),
            Write::Put { id, .. } => (id, "update"),
            Write::Remove { id } => (id, "delete"),
            Write::Noop { id } => (id, "none"),
        };
        MutationResult {
            id: id.clone(),
            operation: operation.to_string(),
        }
    }
}

pub(crate) fn new_transaction_id() -> String {
    Uuid::now_v7().to_string()
}

/// Decide the write for `mutation` given the document currently stored
/// under its id. Assigns fresh revisions and timestamps.
pub(crate) fn resolve(
    mutation: &Mutation,
    existing: Option<&Value>,
    now: DateTime<Utc>,
) -> StoreResult<Write> {
    let id = mutation.document_id().unwrap_or_default().to_string();
    match mutation {
        Mutation::Create(doc) => {
            if existing.is_some() {
                return Err(StoreError::AlreadyExists(id));
            }
            Ok(Write::Put {
                doc: stamp(doc, None, now)?,
                id,
            })
        }
        Mutation::CreateOrReplace(doc) => Ok(Write::Put {
            doc: stamp(doc, existing, now)?,
            id,
        }),
        Mutation::CreateIfNotExists(doc) => match existing {
            Some(_) => Ok(Write::Noop { id }),
            None => Ok(Write::Put {
                doc: stamp(doc, None, now)?,
                id,
            }),
        },
        Mutation::Delete(_) => match existing {
            Some(_) => Ok(Write::Remove { id }),
            None => Ok(Write::Noop { id }),
        },
        Mutation::Patch(patch) => {
            let current = existing.ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if let Some(expected) = &patch.if_revision_id {
                let rev = current.get("_rev").and_then(Value::as_str).unwrap_or_default();
                if rev != expected {
                    return Err(StoreError::RevisionConflict {
                        id,
                        expected: expected.clone(),
                    });
                }
            }
            let mut fields: Map<String, Value> =
                current.as_object().cloned().unwrap_or_default();
            apply_patch(&mut fields, &patch.operations)?;
            fields.insert("_rev".into(), Value::String(new_revision()));
            fields.insert("_updatedAt".into(), Value::String(now.to_rfc3339()));
            Ok(Write::Put {
                doc: Value::Object(fields),
                id,
            })
        }
    }
}

fn new_revision() -> String {
    Uuid::new_v4().simple().to_string()
}

fn stamp(doc: &Value, existing: Option<&Value>, now: DateTime<Utc>) -> StoreResult<Value> {
    validate_document(doc)?;
    let mut fields = doc.as_object().cloned().unwrap_or_default();
    let created_at = existing
        .and_then(|e| e.get("_createdAt"))
        .cloned()
        .unwrap_or_else(|| Value::String(now.to_rfc3339()));
    fields.insert("_createdAt".into(), created_at);
    fields.insert("_updatedAt".into(), Value::String(now.to_rfc3339()));
    fields.insert("_rev".into(), Value::String(new_revision()));
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{PatchMutation, PatchOperations};
    use serde_json::json;

    #[test]
    fn create_stamps_system_fields() {
        let write = resolve(
            &Mutation::Create(json!({"_id": "a", "_type": "page"})),
            None,
            Utc::now(),
        )
        .unwrap();
        let Write::Put { doc, .. } = write else { panic!("expected put") };
        assert!(doc["_rev"].as_str().is_some_and(|r| !r.is_empty()));
        assert!(doc["_createdAt"].is_string());
    }

    #[test]
    fn create_on_existing_fails() {
        let existing = json!({"_id": "a", "_type": "page"});
        let err = resolve(
            &Mutation::Create(json!({"_id": "a", "_type": "page"})),
            Some(&existing),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == "a"));
    }

    #[test]
    fn replace_keeps_created_at() {
        let existing = json!({"_id": "a", "_type": "page", "_createdAt": "2020-01-01T00:00:00+00:00"});
        let Write::Put { doc, .. } = resolve(
            &Mutation::CreateOrReplace(json!({"_id": "a", "_type": "page"})),
            Some(&existing),
            Utc::now(),
        )
        .unwrap() else {
            panic!("expected put")
        };
        assert_eq!(doc["_createdAt"], json!("2020-01-01T00:00:00+00:00"));
    }

    #[test]
    fn patch_checks_revision() {
        let existing = json!({"_id": "a", "_type": "page", "_rev": "r1"});
        let mutation = Mutation::Patch(PatchMutation {
            id: "a".into(),
            if_revision_id: Some("r0".into()),
            operations: PatchOperations::default().set("title", json!("x")),
        });
        assert!(matches!(
            resolve(&mutation, Some(&existing), Utc::now()),
            Err(StoreError::RevisionConflict { .. })
        ));
    }

    #[test]
    fn patch_missing_document_is_not_found() {
        let mutation = Mutation::patch("ghost", PatchOperations::default().set("a", json!(1)));
        assert!(matches!(
            resolve(&mutation, None, Utc::now()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_missing_is_noop() {
        let write = resolve(&Mutation::delete("ghost"), None, Utc::now()).unwrap();
        assert_eq!(write, Write::Noop { id: "ghost".into() });
    }
}
