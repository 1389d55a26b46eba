// In-memory evaluation of queries over JSON documents.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::{Filter, Operand, Params, Perspective, Query};
use crate::document::is_draft_id;

/// Resolve a dotted path (`slug.current`) inside a document.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, segment| value.get(segment))
}

impl Operand {
    /// `None` when a referenced parameter was not supplied; comparisons
    /// against an unbound parameter never match.
    pub fn resolve<'a>(&'a self, params: &'a Params) -> Option<Cow<'a, Value>> {
        match self {
            Operand::Literal(value) => Some(Cow::Borrowed(value)),
            Operand::Param(name) => params.get(name).map(Cow::Borrowed),
            Operand::Now => Some(Cow::Owned(Value::String(
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ))),
        }
    }
}

impl Filter {
    pub fn matches(&self, doc: &Value, params: &Params) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, operand) => operand
                .resolve(params)
                .is_some_and(|value| field(doc, path) == value.as_ref()),
            Filter::Neq(path, operand) => operand
                .resolve(params)
                .is_some_and(|value| field(doc, path) != value.as_ref()),
            Filter::Gte(path, operand) => operand.resolve(params).is_some_and(|value| {
                let current = field(doc, path);
                !current.is_null()
                    && rank(current) == rank(&value)
                    && compare(current, &value) != Ordering::Less
            }),
            Filter::Defined(path) => !field(doc, path).is_null(),
            Filter::References(operand) => match operand.resolve(params).as_deref() {
                Some(Value::String(id)) => references(doc, id),
                _ => false,
            },
            Filter::And(l, r) => l.matches(doc, params) && r.matches(doc, params),
            Filter::Or(l, r) => l.matches(doc, params) || r.matches(doc, params),
            Filter::Not(inner) => !inner.matches(doc, params),
        }
    }
}

impl Query {
    /// Whether a single document is selected, ignoring order and limit.
    pub fn matches(&self, doc: &Value, params: &Params) -> bool {
        if self.perspective == Perspective::Published {
            let id = doc.get("_id").and_then(Value::as_str).unwrap_or_default();
            if is_draft_id(id) {
                return false;
            }
        }
        if let Some(doc_type) = &self.doc_type {
            if doc.get("_type").and_then(Value::as_str) != Some(doc_type.as_str()) {
                return false;
            }
        }
        self.filter.matches(doc, params)
    }

    /// Select, order and slice documents.
    pub fn run<'a>(&self, docs: impl IntoIterator<Item = &'a Value>, params: &Params) -> Vec<Value> {
        let mut selected: Vec<Value> = docs
            .into_iter()
            .filter(|doc| self.matches(doc, params))
            .cloned()
            .collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ordering = compare(field(a, &order.field), field(b, &order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn field<'a>(doc: &'a Value, path: &str) -> &'a Value {
    lookup(doc, path).unwrap_or(&Value::Null)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used for sorting: null < bool < number < string.
/// ISO-8601 timestamps compare correctly as strings.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Whether any nested `_ref` in the value points at `ref_id`.
fn references(val: &Value, ref_id: &str) -> bool {
    match val {
        Value::Object(map) => {
            if let Some(Value::String(r)) = map.get("_ref") {
                if r == ref_id {
                    return true;
                }
            }
            map.values().any(|v| references(v, ref_id))
        }
        Value::Array(arr) => arr.iter().any(|v| references(v, ref_id)),
        _ => false,
    }
}
