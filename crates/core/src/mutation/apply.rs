use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::document::SYSTEM_FIELDS;

use super::types::PatchOperations;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("cannot {op} non-numeric value at {path}")]
    NotANumber { op: &'static str, path: String },
    #[error("path {0} runs through a non-object value")]
    NotAnObject(String),
    #[error("system field {0} cannot be patched")]
    SystemField(String),
}

/// Apply patch operations to a document's fields, in the order
/// setIfMissing, set, unset, inc, dec.
pub fn apply_patch(doc: &mut Map<String, Value>, ops: &PatchOperations) -> Result<(), PatchError> {
    if let Some(values) = &ops.set_if_missing {
        for (path, value) in values {
            guard_system_field(path)?;
            let (parent, leaf) = parent_mut(doc, path)?;
            parent
                .entry(leaf.to_string())
                .or_insert_with(|| value.clone());
        }
    }
    if let Some(values) = &ops.set {
        for (path, value) in values {
            guard_system_field(path)?;
            let (parent, leaf) = parent_mut(doc, path)?;
            parent.insert(leaf.to_string(), value.clone());
        }
    }
    if let Some(paths) = &ops.unset {
        for path in paths {
            guard_system_field(path)?;
            unset_path(doc, path);
        }
    }
    if let Some(values) = &ops.inc {
        for (path, delta) in values {
            add_at(doc, path, delta, "inc", false)?;
        }
    }
    if let Some(values) = &ops.dec {
        for (path, delta) in values {
            add_at(doc, path, delta, "dec", true)?;
        }
    }
    Ok(())
}

fn guard_system_field(path: &str) -> Result<(), PatchError> {
    let head = path.split('.').next().unwrap_or(path);
    if SYSTEM_FIELDS.contains(&head) {
        return Err(PatchError::SystemField(path.to_string()));
    }
    Ok(())
}

/// Walk to the object holding the last path segment, creating objects on the way.
fn parent_mut<'a, 'p>(
    doc: &'a mut Map<String, Value>,
    path: &'p str,
) -> Result<(&'a mut Map<String, Value>, &'p str), PatchError> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };
    let mut current = doc;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => return Err(PatchError::NotAnObject(path.to_string())),
        };
    }
    Ok((current, leaf))
}

fn unset_path(doc: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = doc.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

fn add_at(
    doc: &mut Map<String, Value>,
    path: &str,
    delta: &Value,
    op: &'static str,
    negate: bool,
) -> Result<(), PatchError> {
    guard_system_field(path)?;
    let not_a_number = || PatchError::NotANumber {
        op,
        path: path.to_string(),
    };
    let delta = match delta {
        Value::Number(n) => n.clone(),
        _ => return Err(not_a_number()),
    };
    let (parent, leaf) = parent_mut(doc, path)?;
    let current = match parent.get(leaf) {
        None | Some(Value::Null) => Number::from(0),
        Some(Value::Number(n)) => n.clone(),
        Some(_) => return Err(not_a_number()),
    };
    let integral = match (current.as_i64(), delta.as_i64()) {
        (Some(a), Some(b)) if negate => a.checked_sub(b),
        (Some(a), Some(b)) => a.checked_add(b),
        _ => None,
    };
    // Integers that would overflow continue as floats.
    let next = match integral {
        Some(n) => Number::from(n),
        None => {
            let a = current.as_f64().unwrap_or(0.0);
            let b = delta.as_f64().unwrap_or(0.0);
            Number::from_f64(if negate { a - b } else { a + b }).ok_or_else(not_a_number)?
        }
    };
    parent.insert(leaf.to_string(), Value::Number(next));
    Ok(())
}
