use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::actions::{disabled_reason, toolbar, DisabledReason, EditorialAction};
use super::state::{DocumentPair, DocumentState};
use super::studio::content_type;
use crate::document::{draft_id, slugify, without_system_fields, Document, DocumentIdKind};
use crate::mutation::{Mutation, PatchOperations};
use crate::query::{Filter, Params, Perspective, Query};
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Error)]
pub enum EditorialError {
    #[error("{action:?} is not available: {reason}")]
    Disabled {
        action: EditorialAction,
        reason: DisabledReason,
    },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid document id: {0}")]
    InvalidId(String),

    #[error("unknown content type: {0}")]
    UnknownType(String),

    #[error("slug {slug:?} is already used by {other}")]
    SlugInUse { slug: String, other: String },

    #[error("slug patch on {0} was not observed")]
    SlugNotObserved(String),

    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EditorialResult<T> = Result<T, EditorialError>;

/// Outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub state: DocumentState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub action: EditorialAction,
    pub label: &'static str,
    pub disabled: Option<DisabledReason>,
}

/// Everything the studio's document form shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentForm {
    pub id: String,
    pub doc_type: String,
    pub state: DocumentState,
    pub archived: bool,
    pub draft: Option<Value>,
    pub published: Option<Value>,
    pub actions: Vec<ActionState>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: Option<String>,
    pub state: DocumentState,
    pub archived: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// First half of a delete: the prompt shown before anything is removed.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    id: String,
    title: Option<String>,
}

impl DeleteRequest {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> String {
        match &self.title {
            Some(title) => format!("Weet je zeker dat je \"{title}\" wilt verwijderen?"),
            None => "Weet je zeker dat je dit document wilt verwijderen?".to_string(),
        }
    }

    /// The user agreed; only a confirmed request can delete.
    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete { id: self.id }
    }
}

#[derive(Debug)]
pub struct ConfirmedDelete {
    id: String,
}

/// How long publish-with-slug waits for its slug patch to become visible.
#[derive(Debug, Clone, Copy)]
pub struct SlugPoll {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for SlugPoll {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(100),
        }
    }
}

/// Removes the document from the in-flight set when the publish ends.
struct PublishGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Executes editorial transitions against the content store.
#[derive(Clone)]
pub struct Editor {
    store: Arc<dyn ContentStore>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    slug_poll: SlugPoll,
}

impl Editor {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            in_flight: Arc::default(),
            slug_poll: SlugPoll::default(),
        }
    }

    pub fn with_slug_poll(mut self, slug_poll: SlugPoll) -> Self {
        self.slug_poll = slug_poll;
        self
    }

    fn base_id(id: &str) -> EditorialResult<String> {
        let kind = DocumentIdKind::parse(id);
        if kind.is_version() || kind.base_id().is_empty() {
            return Err(EditorialError::InvalidId(id.to_string()));
        }
        Ok(kind.base_id().to_string())
    }

    pub fn is_publishing(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    fn begin_publish(&self, base: &str, action: EditorialAction) -> EditorialResult<PublishGuard> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(base.to_string()) {
            return Err(EditorialError::Disabled {
                action,
                reason: DisabledReason::AlreadyPublishing,
            });
        }
        Ok(PublishGuard {
            in_flight: Arc::clone(&self.in_flight),
            id: base.to_string(),
        })
    }

    fn check(action: EditorialAction, pair: &DocumentPair) -> EditorialResult<()> {
        match disabled_reason(action, pair, false) {
            Some(reason) => Err(EditorialError::Disabled { action, reason }),
            None => Ok(()),
        }
    }

    /// Load both revision slots of a document.
    pub async fn load(&self, id: &str) -> EditorialResult<DocumentPair> {
        let base = Self::base_id(id)?;
        let draft_slot = draft_id(&base);
        let (draft, published) =
            tokio::try_join!(self.store.get(&draft_slot), self.store.get(&base))?;
        Ok(DocumentPair::from_values(base, draft, published))
    }

    pub async fn form(&self, id: &str) -> EditorialResult<DocumentForm> {
        let pair = self.load(id).await?;
        let Some(current) = pair.current() else {
            return Err(EditorialError::NotFound(pair.id));
        };
        let doc_type = current._type.clone();
        let archived = pair.is_archived();
        let publishing = self.is_publishing(&pair.id);
        let actions = toolbar(&doc_type, archived)
            .into_iter()
            .map(|action| ActionState {
                action,
                label: action.label(),
                disabled: disabled_reason(action, &pair, publishing),
            })
            .collect();
        Ok(DocumentForm {
            state: pair.state(),
            draft: pair.draft.as_ref().map(Document::to_value),
            published: pair.published.as_ref().map(Document::to_value),
            id: pair.id,
            doc_type,
            archived,
            actions,
        })
    }

    /// One row per document of a type, most recently edited first.
    pub async fn list(&self, doc_type: &str) -> EditorialResult<Vec<DocumentSummary>> {
        if content_type(doc_type).is_none() {
            return Err(EditorialError::UnknownType(doc_type.to_string()));
        }
        let query = Query::of_type(doc_type).perspective(Perspective::Raw);
        let docs = self.store.fetch(&query, &Params::new()).await?;

        let mut slots: BTreeMap<String, (Option<Value>, Option<Value>)> = BTreeMap::new();
        for doc in docs {
            let id = doc.get("_id").and_then(Value::as_str).unwrap_or_default();
            let kind = DocumentIdKind::parse(id);
            if kind.is_version() {
                continue;
            }
            let entry = slots.entry(kind.base_id().to_string()).or_default();
            if kind.is_draft() {
                entry.0 = Some(doc);
            } else {
                entry.1 = Some(doc);
            }
        }

        let mut summaries: Vec<DocumentSummary> = slots
            .into_iter()
            .map(|(id, (draft, published))| {
                let pair = DocumentPair::from_values(id, draft, published);
                DocumentSummary {
                    title: pair.title().map(str::to_string),
                    state: pair.state(),
                    archived: pair.is_archived(),
                    updated_at: pair.current().map(|d| d.updated_at),
                    id: pair.id,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Start a new document as a draft.
    pub async fn create_draft(
        &self,
        doc_type: &str,
        fields: Map<String, Value>,
    ) -> EditorialResult<Transition> {
        if content_type(doc_type).is_none() {
            return Err(EditorialError::UnknownType(doc_type.to_string()));
        }
        let base = Uuid::new_v4().to_string();
        let mut doc = without_system_fields(&Value::Object(fields));
        doc.insert("_id".into(), Value::String(draft_id(&base)));
        doc.insert("_type".into(), Value::String(doc_type.to_string()));
        self.store.create(Value::Object(doc)).await?;
        tracing::info!(document_id = %base, doc_type, "draft created");
        Ok(Transition {
            id: base,
            state: DocumentState::Drafted,
        })
    }

    /// Apply an edit to the draft, creating the draft from the published
    /// revision first when needed.
    pub async fn edit(&self, id: &str, operations: PatchOperations) -> EditorialResult<Transition> {
        let pair = self.load(id).await?;
        if !pair.exists() {
            return Err(EditorialError::NotFound(pair.id));
        }
        let mut batch = Vec::with_capacity(2);
        if let (None, Some(published)) = (&pair.draft, &pair.published) {
            batch.push(Mutation::CreateIfNotExists(draft_copy(published)));
        }
        batch.push(Mutation::patch(draft_id(&pair.id), operations));
        self.store.mutate(batch).await?;
        Ok(Transition {
            id: pair.id,
            state: DocumentState::Drafted,
        })
    }

    /// Promote the draft to published and clear it.
    pub async fn publish(&self, id: &str) -> EditorialResult<Transition> {
        let base = Self::base_id(id)?;
        let _guard = self.begin_publish(&base, EditorialAction::Publish)?;
        let pair = self.load(&base).await?;
        Self::check(EditorialAction::Publish, &pair)?;
        self.commit_draft(&pair).await
    }

    /// Publish, first deriving a slug from the title when none is set. The
    /// publish waits until the slug patch is visible on the draft.
    pub async fn publish_with_slug(&self, id: &str) -> EditorialResult<Transition> {
        let base = Self::base_id(id)?;
        let _guard = self.begin_publish(&base, EditorialAction::PublishWithSlug)?;
        let mut pair = self.load(&base).await?;
        Self::check(EditorialAction::PublishWithSlug, &pair)?;

        let derived = pair
            .draft
            .as_ref()
            .filter(|draft| draft.slug().is_none())
            .and_then(|draft| draft.str_field("title"))
            .map(slugify)
            .filter(|slug| !slug.is_empty());

        if let Some(slug) = derived {
            let operations =
                PatchOperations::default().set("slug", json!({"_type": "slug", "current": slug}));
            self.store.patch(&draft_id(&base), operations).await?;
            tracing::info!(document_id = %base, %slug, "slug derived from title");
            pair = self.await_slug(&base, &slug).await?;
        }

        self.commit_draft(&pair).await
    }

    async fn await_slug(&self, base: &str, slug: &str) -> EditorialResult<DocumentPair> {
        for attempt in 0..self.slug_poll.attempts {
            let pair = self.load(base).await?;
            if pair.draft.as_ref().and_then(Document::slug) == Some(slug) {
                return Ok(pair);
            }
            tracing::debug!(document_id = %base, attempt, "slug patch not visible yet");
            tokio::time::sleep(self.slug_poll.interval).await;
        }
        Err(EditorialError::SlugNotObserved(base.to_string()))
    }

    /// Revert to the published revision by dropping the draft.
    pub async fn discard_changes(&self, id: &str) -> EditorialResult<Transition> {
        let pair = self.load(id).await?;
        Self::check(EditorialAction::DiscardChanges, &pair)?;
        self.store.delete(&draft_id(&pair.id)).await?;
        tracing::info!(document_id = %pair.id, "draft discarded");
        let state = if pair.published.is_some() {
            DocumentState::Published
        } else {
            DocumentState::New
        };
        Ok(Transition { id: pair.id, state })
    }

    /// New draft pre-filled from the current revision, under a new id.
    pub async fn duplicate(&self, id: &str) -> EditorialResult<Transition> {
        let pair = self.load(id).await?;
        Self::check(EditorialAction::Duplicate, &pair)?;
        let Some(current) = pair.current() else {
            return Err(EditorialError::NotFound(pair.id));
        };
        let base = Uuid::new_v4().to_string();
        let mut doc = current.content.clone();
        doc.insert("_id".into(), Value::String(draft_id(&base)));
        doc.insert("_type".into(), Value::String(current._type.clone()));
        self.store.create(Value::Object(doc)).await?;
        tracing::info!(source_id = %pair.id, document_id = %base, "document duplicated");
        Ok(Transition {
            id: base,
            state: DocumentState::Drafted,
        })
    }

    /// Toggle `isArchived` and publish straight away, so the flag never
    /// lingers as an unpublished draft.
    pub async fn set_archived(&self, id: &str, archived: bool) -> EditorialResult<Transition> {
        let action = if archived {
            EditorialAction::Archive
        } else {
            EditorialAction::Unarchive
        };
        let base = Self::base_id(id)?;
        let _guard = self.begin_publish(&base, action)?;
        let pair = self.load(&base).await?;
        Self::check(action, &pair)?;
        if let Some(current) = pair.current() {
            self.ensure_slug_free(&base, current).await?;
        }

        let mut batch = Vec::with_capacity(2);
        if let (None, Some(published)) = (&pair.draft, &pair.published) {
            batch.push(Mutation::CreateIfNotExists(draft_copy(published)));
        }
        batch.push(Mutation::patch(
            draft_id(&base),
            PatchOperations::default().set("isArchived", Value::Bool(archived)),
        ));
        self.store.mutate(batch).await?;

        let pair = self.load(&base).await?;
        let transition = self.commit_draft(&pair).await?;
        tracing::info!(document_id = %base, archived, "archive flag published");
        Ok(transition)
    }

    pub async fn request_delete(&self, id: &str) -> EditorialResult<DeleteRequest> {
        let pair = self.load(id).await?;
        Self::check(EditorialAction::Delete, &pair)?;
        Ok(DeleteRequest {
            title: pair.title().map(str::to_string),
            id: pair.id,
        })
    }

    /// Remove both revisions. Irreversible.
    pub async fn delete(&self, confirmed: ConfirmedDelete) -> EditorialResult<Transition> {
        let ConfirmedDelete { id } = confirmed;
        self.store
            .mutate(vec![Mutation::delete(draft_id(&id)), Mutation::delete(id.clone())])
            .await?;
        tracing::info!(document_id = %id, "document deleted");
        Ok(Transition {
            id,
            state: DocumentState::Deleted,
        })
    }

    /// Run a toolbar action by name. Delete only proceeds when `confirmed`.
    pub async fn run(
        &self,
        action: EditorialAction,
        id: &str,
        confirmed: bool,
    ) -> EditorialResult<Transition> {
        match action {
            EditorialAction::Publish => self.publish(id).await,
            EditorialAction::PublishWithSlug => self.publish_with_slug(id).await,
            EditorialAction::DiscardChanges => self.discard_changes(id).await,
            EditorialAction::Duplicate => self.duplicate(id).await,
            EditorialAction::Archive => self.set_archived(id, true).await,
            EditorialAction::Unarchive => self.set_archived(id, false).await,
            EditorialAction::Delete => {
                let request = self.request_delete(id).await?;
                if !confirmed {
                    return Err(EditorialError::ConfirmationRequired(request.prompt()));
                }
                self.delete(request.confirm()).await
            }
        }
    }

    async fn commit_draft(&self, pair: &DocumentPair) -> EditorialResult<Transition> {
        let Some(draft) = &pair.draft else {
            return Err(EditorialError::Disabled {
                action: EditorialAction::Publish,
                reason: DisabledReason::NoChanges,
            });
        };
        self.ensure_slug_free(&pair.id, draft).await?;
        let mut published = draft.to_value();
        if let Some(fields) = published.as_object_mut() {
            fields.insert("_id".into(), Value::String(pair.id.clone()));
        }
        self.store
            .mutate(vec![
                Mutation::CreateOrReplace(published),
                Mutation::delete(draft_id(&pair.id)),
            ])
            .await?;
        tracing::info!(document_id = %pair.id, doc_type = %draft._type, "draft published");
        Ok(Transition {
            id: pair.id.clone(),
            state: DocumentState::Published,
        })
    }

    async fn ensure_slug_free(&self, base: &str, draft: &Document) -> EditorialResult<()> {
        let Some(slug) = draft.slug() else {
            return Ok(());
        };
        let query = Query::of_type(draft._type.as_str()).filter(Filter::eq_param("slug.current", "slug"));
        let mut params = Params::new();
        params.insert("slug".into(), Value::String(slug.to_string()));
        let owners = self.store.fetch(&query, &params).await?;
        let other = owners
            .iter()
            .filter_map(|doc| doc.get("_id").and_then(Value::as_str))
            .find(|owner| *owner != base);
        match other {
            Some(other) => Err(EditorialError::SlugInUse {
                slug: slug.to_string(),
                other: other.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Draft-slot copy of a published revision.
fn draft_copy(published: &Document) -> Value {
    let mut doc = published.content.clone();
    doc.insert("_id".into(), Value::String(draft_id(&published._id)));
    doc.insert("_type".into(), Value::String(published._type.clone()));
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::MutationResponse;
    use crate::store::{MemoryStore, StoreResult};
    use async_trait::async_trait;

    fn fast_poll() -> SlugPoll {
        SlugPoll {
            attempts: 3,
            interval: Duration::from_millis(1),
        }
    }

    async fn editor_with(docs: Vec<Value>) -> (Editor, MemoryStore) {
        let store = MemoryStore::seeded(docs).await.unwrap();
        let editor = Editor::new(Arc::new(store.clone())).with_slug_poll(fast_poll());
        (editor, store)
    }

    #[tokio::test]
    async fn publish_with_slug_sets_slug_before_publishing() {
        let (editor, store) = editor_with(vec![json!({
            "_id": "drafts.n1",
            "_type": "newsPost",
            "title": "Buurtfeest 2024"
        })])
        .await;

        let transition = editor.publish_with_slug("n1").await.unwrap();
        assert_eq!(transition.state, DocumentState::Published);

        let published = store.get("n1").await.unwrap().unwrap();
        assert_eq!(published["slug"]["current"], "buurtfeest-2024");
        assert!(store.get("drafts.n1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn publish_with_slug_keeps_existing_slug() {
        let (editor, store) = editor_with(vec![json!({
            "_id": "drafts.n1",
            "_type": "newsPost",
            "title": "Nieuwe titel",
            "slug": {"_type": "slug", "current": "oude-slug"}
        })])
        .await;

        editor.publish_with_slug("n1").await.unwrap();
        let published = store.get("n1").await.unwrap().unwrap();
        assert_eq!(published["slug"]["current"], "oude-slug");
    }

    #[tokio::test]
    async fn publish_without_draft_is_disabled() {
        let (editor, _) = editor_with(vec![json!({"_id": "p1", "_type": "page", "title": "Over ons"})]).await;
        let err = editor.publish("p1").await.unwrap_err();
        assert!(matches!(
            err,
            EditorialError::Disabled {
                reason: DisabledReason::NoChanges,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn second_publish_is_rejected_while_first_runs() {
        let (editor, _) = editor_with(vec![json!({"_id": "drafts.p1", "_type": "page", "title": "A"})]).await;

        let guard = editor.begin_publish("p1", EditorialAction::Publish).unwrap();
        assert!(editor.is_publishing("p1"));
        let err = editor.publish("p1").await.unwrap_err();
        assert!(matches!(
            err,
            EditorialError::Disabled {
                reason: DisabledReason::AlreadyPublishing,
                ..
            }
        ));

        drop(guard);
        assert!(!editor.is_publishing("p1"));
        editor.publish("p1").await.unwrap();
    }

    #[tokio::test]
    async fn publish_rejects_slug_used_by_another_document() {
        let (editor, _) = editor_with(vec![
            json!({"_id": "a1", "_type": "buurtActie", "slug": {"current": "pannenkoeken"}}),
            json!({"_id": "drafts.a2", "_type": "buurtActie", "slug": {"current": "pannenkoeken"}}),
        ])
        .await;

        let err = editor.publish_with_slug("a2").await.unwrap_err();
        match err {
            EditorialError::SlugInUse { slug, other } => {
                assert_eq!(slug, "pannenkoeken");
                assert_eq!(other, "a1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn archive_publishes_immediately_and_leaves_no_draft() {
        let (editor, store) = editor_with(vec![json!({
            "_id": "a1",
            "_type": "buurtActie",
            "title": "Snoeidag"
        })])
        .await;

        let transition = editor.set_archived("a1", true).await.unwrap();
        assert_eq!(transition.state, DocumentState::Published);
        assert_eq!(store.get("a1").await.unwrap().unwrap()["isArchived"], true);
        assert!(store.get("drafts.a1").await.unwrap().is_none());

        let err = editor.set_archived("a1", true).await.unwrap_err();
        assert!(matches!(
            err,
            EditorialError::Disabled {
                reason: DisabledReason::AlreadyArchived,
                ..
            }
        ));

        editor.set_archived("a1", false).await.unwrap();
        assert_eq!(store.get("a1").await.unwrap().unwrap()["isArchived"], false);
    }

    #[tokio::test]
    async fn archive_refuses_draft_slug_owned_by_another_document() {
        let (editor, store) = editor_with(vec![
            json!({"_id": "a1", "_type": "buurtActie", "slug": {"current": "snoeidag"}}),
            json!({"_id": "a2", "_type": "buurtActie", "slug": {"current": "snoeidag-2"}}),
            json!({"_id": "drafts.a2", "_type": "buurtActie", "slug": {"current": "snoeidag"}}),
        ])
        .await;

        let err = editor.set_archived("a2", true).await.unwrap_err();
        assert!(matches!(err, EditorialError::SlugInUse { ref other, .. } if other == "a1"));
        let published = store.get("a2").await.unwrap().unwrap();
        assert_eq!(published["slug"]["current"], "snoeidag-2");
        assert!(published.get("isArchived").is_none());
        let draft = store.get("drafts.a2").await.unwrap().unwrap();
        assert!(draft.get("isArchived").is_none());
    }

    #[tokio::test]
    async fn run_refuses_actions_missing_from_the_toolbar() {
        let (editor, store) = editor_with(vec![json!({"_id": "p1", "_type": "page", "title": "Over ons"})]).await;

        for action in [EditorialAction::Archive, EditorialAction::PublishWithSlug] {
            let err = editor.run(action, "p1", false).await.unwrap_err();
            assert!(matches!(
                err,
                EditorialError::Disabled {
                    reason: DisabledReason::NotOffered,
                    ..
                }
            ));
        }
        let page = store.get("p1").await.unwrap().unwrap();
        assert!(page.get("isArchived").is_none());
        assert!(store.get("drafts.p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn discard_reverts_to_published() {
        let (editor, store) = editor_with(vec![
            json!({"_id": "p1", "_type": "page", "title": "Oud"}),
            json!({"_id": "drafts.p1", "_type": "page", "title": "Nieuw"}),
        ])
        .await;

        let transition = editor.discard_changes("p1").await.unwrap();
        assert_eq!(transition.state, DocumentState::Published);
        assert!(store.get("drafts.p1").await.unwrap().is_none());
        assert_eq!(store.get("p1").await.unwrap().unwrap()["title"], "Oud");
    }

    #[tokio::test]
    async fn discard_is_disabled_for_identical_draft() {
        let (editor, _) = editor_with(vec![
            json!({"_id": "p1", "_type": "page", "title": "Zelfde"}),
            json!({"_id": "drafts.p1", "_type": "page", "title": "Zelfde"}),
        ])
        .await;

        let err = editor.discard_changes("p1").await.unwrap_err();
        assert!(matches!(
            err,
            EditorialError::Disabled {
                reason: DisabledReason::NotDiverged,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_creates_new_draft_with_copied_fields() {
        let (editor, store) = editor_with(vec![json!({
            "_id": "g1",
            "_type": "gallery",
            "title": "Koningsdag"
        })])
        .await;

        let transition = editor.duplicate("g1").await.unwrap();
        assert_ne!(transition.id, "g1");
        assert_eq!(transition.state, DocumentState::Drafted);

        let copy = store.get(&draft_id(&transition.id)).await.unwrap().unwrap();
        assert_eq!(copy["_type"], "gallery");
        assert_eq!(copy["title"], "Koningsdag");
        assert!(store.get(&transition.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (editor, store) = editor_with(vec![
            json!({"_id": "p1", "_type": "page", "title": "Weg"}),
            json!({"_id": "drafts.p1", "_type": "page", "title": "Weg ermee"}),
        ])
        .await;

        let err = editor.run(EditorialAction::Delete, "p1", false).await.unwrap_err();
        assert!(matches!(err, EditorialError::ConfirmationRequired(_)));
        assert!(store.get("p1").await.unwrap().is_some());

        let request = editor.request_delete("p1").await.unwrap();
        assert!(request.prompt().contains("Weg ermee"));
        let transition = editor.delete(request.confirm()).await.unwrap();
        assert_eq!(transition.state, DocumentState::Deleted);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn edit_creates_draft_from_published() {
        let (editor, store) = editor_with(vec![json!({"_id": "p1", "_type": "page", "title": "Oud"})]).await;

        editor
            .edit("p1", PatchOperations::default().set("title", json!("Nieuw")))
            .await
            .unwrap();

        assert_eq!(store.get("drafts.p1").await.unwrap().unwrap()["title"], "Nieuw");
        assert_eq!(store.get("p1").await.unwrap().unwrap()["title"], "Oud");
    }

    #[tokio::test]
    async fn version_ids_are_rejected() {
        let (editor, _) = editor_with(vec![]).await;
        let err = editor.load("versions.r1.p1").await.unwrap_err();
        assert!(matches!(err, EditorialError::InvalidId(_)));
    }

    #[tokio::test]
    async fn list_groups_draft_and_published_slots() {
        let (editor, _) = editor_with(vec![
            json!({"_id": "p1", "_type": "page", "title": "Een"}),
            json!({"_id": "drafts.p1", "_type": "page", "title": "Een (concept)"}),
            json!({"_id": "p2", "_type": "page", "title": "Twee"}),
            json!({"_id": "n1", "_type": "newsPost", "title": "Ander type"}),
        ])
        .await;

        let rows = editor.list("page").await.unwrap();
        assert_eq!(rows.len(), 2);
        let p1 = rows.iter().find(|r| r.id == "p1").unwrap();
        assert_eq!(p1.state, DocumentState::Drafted);
        assert_eq!(p1.title.as_deref(), Some("Een (concept)"));

        assert!(matches!(
            editor.list("unknown").await.unwrap_err(),
            EditorialError::UnknownType(_)
        ));
    }

    #[tokio::test]
    async fn form_reports_toolbar_states() {
        let (editor, _) = editor_with(vec![json!({"_id": "n1", "_type": "newsPost", "title": "Hallo"})]).await;

        let form = editor.form("n1").await.unwrap();
        assert_eq!(form.state, DocumentState::Published);
        let actions: Vec<_> = form.actions.iter().map(|a| a.action).collect();
        assert_eq!(actions[0], EditorialAction::PublishWithSlug);
        assert_eq!(form.actions[0].disabled, Some(DisabledReason::NoChanges));
    }

    /// Accepts patches but never applies them.
    struct DroppingStore(MemoryStore);

    #[async_trait]
    impl ContentStore for DroppingStore {
        async fn fetch(&self, query: &Query, params: &Params) -> StoreResult<Vec<Value>> {
            self.0.fetch(query, params).await
        }

        async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
            self.0.get(id).await
        }

        async fn mutate(&self, mutations: Vec<Mutation>) -> StoreResult<MutationResponse> {
            let kept = mutations
                .into_iter()
                .filter(|m| !matches!(m, Mutation::Patch(_)))
                .collect();
            self.0.mutate(kept).await
        }

        async fn health(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_with_slug_waits_for_slug_and_gives_up() {
        let inner = MemoryStore::seeded(vec![json!({
            "_id": "drafts.n1",
            "_type": "newsPost",
            "title": "Nooit zichtbaar"
        })])
        .await
        .unwrap();
        let editor = Editor::new(Arc::new(DroppingStore(inner.clone()))).with_slug_poll(fast_poll());

        let err = editor.publish_with_slug("n1").await.unwrap_err();
        assert!(matches!(err, EditorialError::SlugNotObserved(_)));
        assert!(inner.get("n1").await.unwrap().is_none());
        assert!(!editor.is_publishing("n1"));
    }
}
