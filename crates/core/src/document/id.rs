//! Revision slot ids. A document's published revision lives at `{id}` and
//! its pending draft at `drafts.{id}`. Release ids (`versions.{release}.{id}`)
//! are only recognised so callers can refuse them.

pub const DRAFT_PREFIX: &str = "drafts.";
const VERSION_PREFIX: &str = "versions.";

/// Which slot a raw id addresses, with the base id it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIdKind {
    Published(String),
    Draft(String),
    Version(String),
}

impl DocumentIdKind {
    pub fn parse(id: &str) -> Self {
        if let Some(base) = id.strip_prefix(DRAFT_PREFIX) {
            return Self::Draft(base.to_string());
        }
        match id.strip_prefix(VERSION_PREFIX).and_then(|rest| rest.split_once('.')) {
            Some((_release, base)) => Self::Version(base.to_string()),
            None => Self::Published(id.to_string()),
        }
    }

    pub fn base_id(&self) -> &str {
        match self {
            Self::Published(base) | Self::Draft(base) | Self::Version(base) => base,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    pub fn is_version(&self) -> bool {
        matches!(self, Self::Version(_))
    }
}

pub fn draft_id(base_id: &str) -> String {
    format!("{DRAFT_PREFIX}{base_id}")
}

pub fn is_draft_id(id: &str) -> bool {
    id.starts_with(DRAFT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_share_a_base_id() {
        let published = DocumentIdKind::parse("actie-zomerfeest");
        let draft = DocumentIdKind::parse(&draft_id("actie-zomerfeest"));
        assert_eq!(published.base_id(), draft.base_id());
        assert!(draft.is_draft());
        assert!(!published.is_draft());
        assert!(is_draft_id("drafts.actie-zomerfeest"));
    }

    #[test]
    fn release_ids_are_flagged() {
        let kind = DocumentIdKind::parse("versions.r1.post-1");
        assert_eq!(kind, DocumentIdKind::Version("post-1".to_string()));
        assert!(kind.is_version());
        // Without a release segment the whole string is a plain id.
        assert_eq!(
            DocumentIdKind::parse("versions.nodot"),
            DocumentIdKind::Published("versions.nodot".to_string())
        );
    }
}
