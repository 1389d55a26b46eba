use serde::Serialize;
use serde_json::Value;

use crate::document::Document;

/// Lifecycle position of a content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentState {
    /// Neither a draft nor a published revision exists.
    New,
    /// A pending draft exists, with or without an earlier published revision.
    Drafted,
    /// Only the published revision exists.
    Published,
    /// Both revisions were removed.
    Deleted,
}

/// Both revision slots of one document: the committed published state and
/// the pending proposed state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPair {
    pub id: String,
    pub draft: Option<Document>,
    pub published: Option<Document>,
}

impl DocumentPair {
    pub fn new(id: impl Into<String>, draft: Option<Document>, published: Option<Document>) -> Self {
        Self {
            id: id.into(),
            draft,
            published,
        }
    }

    /// Build from raw slot values; unreadable slots count as absent.
    pub fn from_values(id: impl Into<String>, draft: Option<Value>, published: Option<Value>) -> Self {
        Self::new(
            id,
            draft.and_then(|v| Document::from_value(v).ok()),
            published.and_then(|v| Document::from_value(v).ok()),
        )
    }

    pub fn state(&self) -> DocumentState {
        match (&self.draft, &self.published) {
            (None, None) => DocumentState::New,
            (Some(_), _) => DocumentState::Drafted,
            (None, Some(_)) => DocumentState::Published,
        }
    }

    /// The revision an editor sees: the draft when there is one.
    pub fn current(&self) -> Option<&Document> {
        self.draft.as_ref().or(self.published.as_ref())
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.current().map(|d| d._type.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.current().and_then(|d| d.str_field("title"))
    }

    pub fn is_archived(&self) -> bool {
        self.current().is_some_and(Document::is_archived)
    }

    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    pub fn exists(&self) -> bool {
        self.draft.is_some() || self.published.is_some()
    }

    /// Whether the draft proposes something other than what is published.
    /// A draft of a never-published document always diverges.
    pub fn draft_diverges(&self) -> bool {
        match (&self.draft, &self.published) {
            (Some(draft), Some(published)) => {
                draft.editable_fields() != published.editable_fields()
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}
