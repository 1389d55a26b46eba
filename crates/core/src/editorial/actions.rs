use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::DocumentPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorialAction {
    Publish,
    PublishWithSlug,
    DiscardChanges,
    Duplicate,
    Archive,
    Unarchive,
    Delete,
}

impl EditorialAction {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "publish" => Self::Publish,
            "publishWithSlug" => Self::PublishWithSlug,
            "discardChanges" => Self::DiscardChanges,
            "duplicate" => Self::Duplicate,
            "archive" => Self::Archive,
            "unarchive" => Self::Unarchive,
            "delete" => Self::Delete,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Publish | Self::PublishWithSlug => "Publiceren",
            Self::DiscardChanges => "Wijzigingen verwerpen",
            Self::Duplicate => "Dupliceren",
            Self::Archive => "Archiveren",
            Self::Unarchive => "Dearchiveren",
            Self::Delete => "Verwijderen",
        }
    }
}

/// Why an action cannot run right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
pub enum DisabledReason {
    #[error("there are no unpublished changes")]
    NoChanges,
    #[error("a publish is already in progress")]
    AlreadyPublishing,
    #[error("the draft does not differ from the published version")]
    NotDiverged,
    #[error("the document is already archived")]
    AlreadyArchived,
    #[error("the document is not archived")]
    NotArchived,
    #[error("there is nothing to delete")]
    NothingToDelete,
    #[error("the document has no content yet")]
    NotReady,
    #[error("this action is not available for this document type")]
    NotOffered,
}

/// Types that need a unique slug get the custom toolbar.
pub const SLUGGED_TYPES: [&str; 2] = ["newsPost", "buurtActie"];

pub fn uses_custom_toolbar(doc_type: &str) -> bool {
    SLUGGED_TYPES.contains(&doc_type)
}

/// Actions offered for a document, in toolbar order.
pub fn toolbar(doc_type: &str, archived: bool) -> Vec<EditorialAction> {
    use EditorialAction::*;
    if uses_custom_toolbar(doc_type) {
        let archive = if archived { Unarchive } else { Archive };
        vec![PublishWithSlug, archive, Duplicate, DiscardChanges, Delete]
    } else {
        vec![Publish, DiscardChanges, Duplicate, Delete]
    }
}

/// Whether the toolbar of `doc_type` carries `action` in either archive state.
pub fn offers(doc_type: &str, action: EditorialAction) -> bool {
    toolbar(doc_type, false).contains(&action) || toolbar(doc_type, true).contains(&action)
}

/// Precondition check for an action. `publishing` reports whether a
/// publish of this document is already running.
pub fn disabled_reason(
    action: EditorialAction,
    pair: &DocumentPair,
    publishing: bool,
) -> Option<DisabledReason> {
    use EditorialAction::*;
    if pair.doc_type().is_some_and(|doc_type| !offers(doc_type, action)) {
        return Some(DisabledReason::NotOffered);
    }
    match action {
        Publish | PublishWithSlug => {
            if publishing {
                Some(DisabledReason::AlreadyPublishing)
            } else if !pair.has_draft() {
                Some(DisabledReason::NoChanges)
            } else {
                None
            }
        }
        DiscardChanges => {
            if !pair.has_draft() {
                Some(DisabledReason::NoChanges)
            } else if !pair.draft_diverges() {
                Some(DisabledReason::NotDiverged)
            } else {
                None
            }
        }
        Duplicate => (!pair.exists()).then_some(DisabledReason::NotReady),
        Archive | Unarchive => {
            if !pair.exists() {
                Some(DisabledReason::NotReady)
            } else if publishing {
                Some(DisabledReason::AlreadyPublishing)
            } else if action == Archive && pair.is_archived() {
                Some(DisabledReason::AlreadyArchived)
            } else if action == Unarchive && !pair.is_archived() {
                Some(DisabledReason::NotArchived)
            } else {
                None
            }
        }
        Delete => (!pair.exists()).then_some(DisabledReason::NothingToDelete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(draft: Option<serde_json::Value>, published: Option<serde_json::Value>) -> DocumentPair {
        DocumentPair::from_values("a", draft, published)
    }

    fn news(id: &str, extra: serde_json::Value) -> Option<serde_json::Value> {
        let mut doc = json!({"_id": id, "_type": "newsPost", "title": "T"});
        if let (Some(map), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
            map.extend(extra.clone());
        }
        Some(doc)
    }

    #[test]
    fn custom_toolbar_for_slugged_types() {
        assert_eq!(
            toolbar("newsPost", false),
            vec![
                EditorialAction::PublishWithSlug,
                EditorialAction::Archive,
                EditorialAction::Duplicate,
                EditorialAction::DiscardChanges,
                EditorialAction::Delete,
            ]
        );
        assert_eq!(toolbar("buurtActie", true)[1], EditorialAction::Unarchive);
        assert_eq!(toolbar("page", false)[0], EditorialAction::Publish);
        assert!(!toolbar("page", false).contains(&EditorialAction::Archive));
    }

    #[test]
    fn publish_requires_draft_and_idle() {
        let published_only = pair(None, news("a", json!({})));
        assert_eq!(
            disabled_reason(EditorialAction::PublishWithSlug, &published_only, false),
            Some(DisabledReason::NoChanges)
        );
        let drafted = pair(news("drafts.a", json!({})), None);
        assert_eq!(disabled_reason(EditorialAction::PublishWithSlug, &drafted, false), None);
        assert_eq!(
            disabled_reason(EditorialAction::PublishWithSlug, &drafted, true),
            Some(DisabledReason::AlreadyPublishing)
        );
    }

    #[test]
    fn discard_requires_divergence() {
        let same = pair(news("drafts.a", json!({})), news("a", json!({})));
        assert_eq!(
            disabled_reason(EditorialAction::DiscardChanges, &same, false),
            Some(DisabledReason::NotDiverged)
        );
        let changed = pair(news("drafts.a", json!({"title": "U"})), news("a", json!({})));
        assert_eq!(disabled_reason(EditorialAction::DiscardChanges, &changed, false), None);
    }

    #[test]
    fn archive_toggles() {
        let live = pair(None, news("a", json!({})));
        assert_eq!(disabled_reason(EditorialAction::Archive, &live, false), None);
        assert_eq!(
            disabled_reason(EditorialAction::Unarchive, &live, false),
            Some(DisabledReason::NotArchived)
        );
        let archived = pair(None, news("a", json!({"isArchived": true})));
        assert_eq!(
            disabled_reason(EditorialAction::Archive, &archived, false),
            Some(DisabledReason::AlreadyArchived)
        );
    }

    #[test]
    fn new_documents_cannot_be_deleted_or_duplicated() {
        let empty = pair(None, None);
        assert_eq!(
            disabled_reason(EditorialAction::Delete, &empty, false),
            Some(DisabledReason::NothingToDelete)
        );
        assert_eq!(
            disabled_reason(EditorialAction::Duplicate, &empty, false),
            Some(DisabledReason::NotReady)
        );
    }

    #[test]
    fn actions_outside_the_toolbar_are_not_offered() {
        let page = pair(None, Some(json!({"_id": "a", "_type": "page", "title": "Over ons"})));
        assert_eq!(
            disabled_reason(EditorialAction::Archive, &page, false),
            Some(DisabledReason::NotOffered)
        );
        assert_eq!(
            disabled_reason(EditorialAction::PublishWithSlug, &page, false),
            Some(DisabledReason::NotOffered)
        );
        let post = pair(news("drafts.a", json!({})), None);
        assert_eq!(
            disabled_reason(EditorialAction::Publish, &post, false),
            Some(DisabledReason::NotOffered)
        );
        assert!(offers("newsPost", EditorialAction::Unarchive));
        assert!(!offers("gallery", EditorialAction::Archive));
    }

    #[test]
    fn parses_action_names() {
        assert_eq!(EditorialAction::parse("discardChanges"), Some(EditorialAction::DiscardChanges));
        assert_eq!(EditorialAction::parse("explode"), None);
    }
}
