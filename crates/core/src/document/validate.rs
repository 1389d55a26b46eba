/// Document validation utilities.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("document _id is required")]
    MissingId,
    #[error("document _type is required")]
    MissingType,
    #[error("document _id cannot be empty")]
    EmptyId,
    #[error("document _type cannot be empty")]
    EmptyType,
    #[error("document _id cannot contain whitespace: {0:?}")]
    InvalidId(String),
}

/// Validate that a document has the minimum required fields.
pub fn validate_document_fields(
    id: Option<&str>,
    doc_type: Option<&str>,
) -> Result<(), ValidationError> {
    match id {
        None => return Err(ValidationError::MissingId),
        Some("") => return Err(ValidationError::EmptyId),
        Some(id) if id.chars().any(char::is_whitespace) => {
            return Err(ValidationError::InvalidId(id.to_string()))
        }
        _ => {}
    }
    match doc_type {
        None => return Err(ValidationError::MissingType),
        Some("") => return Err(ValidationError::EmptyType),
        _ => {}
    }
    Ok(())
}

/// Validate a raw JSON document before it is written.
pub fn validate_document(doc: &serde_json::Value) -> Result<(), ValidationError> {
    validate_document_fields(
        doc.get("_id").and_then(|v| v.as_str()),
        doc.get("_type").and_then(|v| v.as_str()),
    )
}
