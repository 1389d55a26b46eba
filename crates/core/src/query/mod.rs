//! Declarative content queries.
//!
//! A [`Query`] is evaluated in memory by the local stores and rendered to a
//! GROQ string for the hosted content API, so every page type has a single
//! fixed query regardless of backend.

pub mod eval;
pub mod groq;

use serde_json::{Map, Value};

pub use eval::lookup;

/// Named parameters referenced by `$name` operands.
pub type Params = Map<String, Value>;

/// Which revisions a query can see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Perspective {
    /// Published revisions only; `drafts.*` ids are invisible.
    #[default]
    Published,
    /// Every stored revision, drafts included.
    Raw,
}

impl Perspective {
    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Param(String),
    /// The current time as an ISO-8601 string, taken at evaluation.
    Now,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Operand),
    Neq(String, Operand),
    /// Field is at least the operand. Only values of the same kind compare;
    /// a missing field never matches.
    Gte(String, Operand),
    Defined(String),
    References(Operand),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), Operand::Literal(value.into()))
    }

    pub fn eq_param(path: impl Into<String>, param: impl Into<String>) -> Self {
        Filter::Eq(path.into(), Operand::Param(param.into()))
    }

    pub fn neq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Neq(path.into(), Operand::Literal(value.into()))
    }

    /// Timestamp field that lies in the present or future.
    pub fn not_before_now(path: impl Into<String>) -> Self {
        Filter::Gte(path.into(), Operand::Now)
    }

    pub fn defined(path: impl Into<String>) -> Self {
        Filter::Defined(path.into())
    }

    pub fn references_param(param: impl Into<String>) -> Self {
        Filter::References(Operand::Param(param.into()))
    }

    /// Excludes soft-hidden documents; a missing flag counts as not archived.
    pub fn not_archived() -> Self {
        Filter::neq("isArchived", true)
    }

    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (a, b) => Filter::And(Box::new(a), Box::new(b)),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub doc_type: Option<String>,
    pub filter: Filter,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub perspective: Perspective,
}

impl Query {
    /// Every document, published perspective.
    pub fn all() -> Self {
        Self {
            doc_type: None,
            filter: Filter::All,
            order: None,
            limit: None,
            perspective: Perspective::Published,
        }
    }

    pub fn of_type(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: Some(doc_type.into()),
            ..Self::all()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = std::mem::replace(&mut self.filter, Filter::All).and(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            field: field.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }
}
