//! Typed public documents and the fixed queries the site pages run.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::query::{Filter, Params, Query};
use crate::sections::{lenient, lenient_list, parse_sections, ImageSource, SectionBlock};
use crate::store::{ContentStore, StoreResult};

/// Slug of the page rendered at the site root.
pub const HOME_SLUG: &str = "home";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "lenient")]
    pub current: String,
}

fn slug_of(slug: &Option<Slug>) -> Option<&str> {
    slug.as_ref().map(|s| s.current.as_str()).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsPost {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(deserialize_with = "lenient")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub main_image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient_list")]
    pub body: Vec<Value>,
}

impl NewsPost {
    pub fn slug(&self) -> Option<&str> {
        slug_of(&self.slug)
    }
}

/// A community action people can sign up for.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuurtActie {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(deserialize_with = "lenient")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub description: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient")]
    pub max_participants: Option<u32>,
}

impl BuurtActie {
    pub fn slug(&self) -> Option<&str> {
        slug_of(&self.slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Gallery {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(deserialize_with = "lenient")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_list")]
    pub images: Vec<ImageSource>,
}

impl Gallery {
    pub fn slug(&self) -> Option<&str> {
        slug_of(&self.slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    pub sections: Value,
}

impl Page {
    pub fn slug(&self) -> Option<&str> {
        slug_of(&self.slug)
    }

    pub fn blocks(&self) -> Vec<SectionBlock> {
        parse_sections(&self.sections)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NavItem {
    #[serde(default, deserialize_with = "lenient")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient")]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Navigation {
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<NavItem>,
}

/// The fixed queries behind each public page.
pub mod queries {
    use super::*;

    pub fn news_list() -> Query {
        Query::of_type("newsPost")
            .filter(Filter::not_archived())
            .order_by("publishedAt", true)
    }

    pub fn action_list() -> Query {
        Query::of_type("buurtActie")
            .filter(Filter::not_archived())
            .order_by("datetime", false)
    }

    /// Actions that have not started yet, soonest first.
    pub fn upcoming_actions() -> Query {
        action_list().filter(Filter::not_before_now("datetime"))
    }

    pub fn gallery_list() -> Query {
        Query::of_type("gallery")
            .filter(Filter::not_archived())
            .order_by("date", true)
    }

    /// Detail lookup by `$slug`.
    pub fn by_slug(doc_type: &str) -> Query {
        Query::of_type(doc_type)
            .filter(Filter::eq_param("slug.current", "slug"))
            .limit(1)
    }

    pub fn singleton(doc_type: &str) -> Query {
        Query::of_type(doc_type).limit(1)
    }
}

/// Read side of the public site.
#[derive(Clone)]
pub struct SiteContent {
    store: Arc<dyn ContentStore>,
}

impl SiteContent {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    async fn list<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<Vec<T>> {
        let docs = self.store.fetch(query, &Params::new()).await?;
        Ok(docs.into_iter().filter_map(decode).collect())
    }

    async fn one<T: DeserializeOwned>(&self, query: &Query, params: &Params) -> StoreResult<Option<T>> {
        Ok(self.store.fetch_first(query, params).await?.and_then(decode))
    }

    async fn by_slug<T: DeserializeOwned>(&self, doc_type: &str, slug: &str) -> StoreResult<Option<T>> {
        let mut params = Params::new();
        params.insert("slug".into(), Value::String(slug.to_string()));
        self.one(&queries::by_slug(doc_type), &params).await
    }

    pub async fn news(&self) -> StoreResult<Vec<NewsPost>> {
        self.list(&queries::news_list()).await
    }

    pub async fn latest_news(&self, count: usize) -> StoreResult<Vec<NewsPost>> {
        self.list(&queries::news_list().limit(count)).await
    }

    pub async fn news_post(&self, slug: &str) -> StoreResult<Option<NewsPost>> {
        self.by_slug("newsPost", slug).await
    }

    pub async fn actions(&self) -> StoreResult<Vec<BuurtActie>> {
        self.list(&queries::action_list()).await
    }

    pub async fn upcoming_actions(&self, count: usize) -> StoreResult<Vec<BuurtActie>> {
        self.list(&queries::upcoming_actions().limit(count)).await
    }

    pub async fn action(&self, slug: &str) -> StoreResult<Option<BuurtActie>> {
        self.by_slug("buurtActie", slug).await
    }

    pub async fn galleries(&self) -> StoreResult<Vec<Gallery>> {
        self.list(&queries::gallery_list()).await
    }

    pub async fn gallery(&self, slug: &str) -> StoreResult<Option<Gallery>> {
        self.by_slug("gallery", slug).await
    }

    pub async fn page(&self, slug: &str) -> StoreResult<Option<Page>> {
        self.by_slug("page", slug).await
    }

    pub async fn settings(&self) -> StoreResult<Option<SiteSettings>> {
        self.one(&queries::singleton("siteSettings"), &Params::new()).await
    }

    pub async fn navigation(&self) -> StoreResult<Option<Navigation>> {
        self.one(&queries::singleton("navigation"), &Params::new()).await
    }
}

fn decode<T: DeserializeOwned>(doc: Value) -> Option<T> {
    let id = doc.get("_id").and_then(Value::as_str).unwrap_or_default().to_string();
    match serde_json::from_value(doc) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::warn!(document_id = %id, error = %err, "skipping undecodable document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Section;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn site(docs: Vec<Value>) -> SiteContent {
        let store = MemoryStore::seeded(docs).await.unwrap();
        SiteContent::new(Arc::new(store))
    }

    #[test]
    fn news_query_matches_cms_query() {
        assert_eq!(
            queries::news_list().to_groq(),
            r#"*[_type == "newsPost" && isArchived != true] | order(publishedAt desc)"#
        );
    }

    #[tokio::test]
    async fn actions_sorted_ascending_without_archived() {
        let site = site(vec![
            json!({"_id": "a1", "_type": "buurtActie", "title": "Later", "datetime": "2024-06-01T10:00:00Z"}),
            json!({"_id": "a2", "_type": "buurtActie", "title": "Eerder", "datetime": "2024-05-01T10:00:00Z"}),
            json!({"_id": "a3", "_type": "buurtActie", "title": "Weg", "datetime": "2024-04-01T10:00:00Z", "isArchived": true}),
            json!({"_id": "drafts.a4", "_type": "buurtActie", "title": "Concept"}),
        ])
        .await;

        let titles: Vec<_> = site.actions().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, ["Eerder", "Later"]);
    }

    #[tokio::test]
    async fn upcoming_actions_leave_out_past_and_undated() {
        let site = site(vec![
            json!({"_id": "a1", "_type": "buurtActie", "title": "Voorbij", "datetime": "2020-05-01T10:00:00Z"}),
            json!({"_id": "a2", "_type": "buurtActie", "title": "Straks", "datetime": "2099-05-01T10:00:00Z"}),
            json!({"_id": "a3", "_type": "buurtActie", "title": "Eerst", "datetime": "2098-05-01T10:00:00Z"}),
            json!({"_id": "a4", "_type": "buurtActie", "title": "Ooit"}),
        ])
        .await;

        let titles: Vec<_> = site
            .upcoming_actions(3)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, ["Eerst", "Straks"]);
        assert_eq!(site.actions().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn news_sorted_newest_first() {
        let site = site(vec![
            json!({"_id": "n1", "_type": "newsPost", "title": "Oud", "publishedAt": "2024-01-01T00:00:00Z"}),
            json!({"_id": "n2", "_type": "newsPost", "title": "Nieuw", "publishedAt": "2024-03-01T00:00:00Z"}),
        ])
        .await;

        let latest = site.latest_news(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].title, "Nieuw");
    }

    #[tokio::test]
    async fn detail_by_slug() {
        let site = site(vec![
            json!({"_id": "g1", "_type": "gallery", "title": "Koningsdag", "slug": {"current": "koningsdag"}, "date": "2024-04-27"}),
            json!({"_id": "g2", "_type": "gallery", "title": "Kerst", "slug": {"current": "kerst"}}),
        ])
        .await;

        let gallery = site.gallery("koningsdag").await.unwrap().unwrap();
        assert_eq!(gallery.id, "g1");
        assert_eq!(gallery.date, NaiveDate::from_ymd_opt(2024, 4, 27));
        assert!(site.gallery("pasen").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_fields_fall_back_to_defaults() {
        let site = site(vec![json!({
            "_id": "a1",
            "_type": "buurtActie",
            "title": 42,
            "slug": {"current": "opruimen"},
            "datetime": "morgen",
            "maxParticipants": "veel"
        })])
        .await;

        let action = site.action("opruimen").await.unwrap().unwrap();
        assert_eq!(action.title, "");
        assert!(action.datetime.is_none());
        assert!(action.max_participants.is_none());
    }

    #[tokio::test]
    async fn page_sections_decode_into_blocks() {
        let site = site(vec![json!({
            "_id": "p1",
            "_type": "page",
            "title": "Over ons",
            "slug": {"current": "over-ons"},
            "sections": [
                {"_type": "divider", "_key": "k1"},
                {"_type": "quoteSection", "_key": "k2", "quote": "Samen"}
            ]
        })])
        .await;

        let page = site.page("over-ons").await.unwrap().unwrap();
        let blocks = page.blocks();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1].section, Section::Quote(_)));
    }

    #[tokio::test]
    async fn singletons_default_to_none() {
        let site = site(vec![json!({
            "_id": "navigation",
            "_type": "navigation",
            "items": [{"label": "Nieuws", "href": "/nieuws"}, "kapot"]
        })])
        .await;

        assert!(site.settings().await.unwrap().is_none());
        let nav = site.navigation().await.unwrap().unwrap();
        assert_eq!(nav.items.len(), 1);
        assert_eq!(nav.items[0].href, "/nieuws");
    }
}
