use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use buurt_core::content::HOME_SLUG;
use buurt_core::store::StoreResult;

use crate::error::{PageError, PageResult};
use crate::state::AppState;
use crate::views::{self, Chrome};

const HOME_LIST_SIZE: usize = 3;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/nieuws", get(news_list))
        .route("/nieuws/{slug}", get(news_post))
        .route("/buurt-acties", get(action_list))
        .route("/buurt-acties/{slug}", get(action))
        .route("/galerij", get(gallery_list))
        .route("/galerij/{slug}", get(gallery))
        .route("/{slug}", get(page))
}

/// A secondary fetch that failed renders as empty instead of failing the page.
fn or_default<T: Default>(result: StoreResult<T>, what: &'static str) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, what, "degraded page fetch");
        T::default()
    })
}

/// Settings and navigation, fetched concurrently.
async fn chrome(state: &AppState) -> Chrome {
    let (settings, navigation) = tokio::join!(state.site().settings(), state.site().navigation());
    Chrome {
        settings: or_default(settings, "siteSettings").unwrap_or_default(),
        navigation: or_default(navigation, "navigation").unwrap_or_default(),
    }
}

async fn home(State(state): State<AppState>) -> PageResult<Html<String>> {
    let site = state.site();
    let (chrome, page, news, actions) = tokio::join!(
        chrome(&state),
        site.page(HOME_SLUG),
        site.latest_news(HOME_LIST_SIZE),
        site.upcoming_actions(HOME_LIST_SIZE),
    );
    let page = or_default(page, "homePage");
    let news = or_default(news, "latestNews");
    let actions = or_default(actions, "upcomingActions");
    let markup = views::home(&chrome, page.as_ref(), &news, &actions, state.render());
    Ok(Html(markup.into_string()))
}

async fn news_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let (chrome, posts) = tokio::join!(chrome(&state), state.site().news());
    Ok(Html(views::news_list(&chrome, &posts?, state.render()).into_string()))
}

async fn news_post(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult<Html<String>> {
    let (chrome, post) = tokio::join!(chrome(&state), state.site().news_post(&slug));
    let post = post?.ok_or(PageError::NotFound)?;
    Ok(Html(views::news_post(&chrome, &post, state.render()).into_string()))
}

async fn action_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let (chrome, actions) = tokio::join!(chrome(&state), state.site().actions());
    Ok(Html(views::action_list(&chrome, &actions?, state.render()).into_string()))
}

async fn action(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult<Html<String>> {
    let (chrome, action) = tokio::join!(chrome(&state), state.site().action(&slug));
    let action = action?.ok_or(PageError::NotFound)?;
    Ok(Html(views::action(&chrome, &action, state.render()).into_string()))
}

async fn gallery_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let (chrome, galleries) = tokio::join!(chrome(&state), state.site().galleries());
    Ok(Html(views::gallery_list(&chrome, &galleries?, state.render()).into_string()))
}

async fn gallery(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult<Html<String>> {
    let (chrome, gallery) = tokio::join!(chrome(&state), state.site().gallery(&slug));
    let gallery = gallery?.ok_or(PageError::NotFound)?;
    Ok(Html(views::gallery(&chrome, &gallery, state.render()).into_string()))
}

async fn page(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult<Html<String>> {
    let (chrome, page) = tokio::join!(chrome(&state), state.site().page(&slug));
    let page = page?.ok_or(PageError::NotFound)?;
    Ok(Html(views::page(&chrome, &page, state.render()).into_string()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{body_text, send, state_with};

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn dynamic_page_renders_known_sections_only() {
        let (state, _) = state_with(vec![
            json!({"_id": "navigation", "_type": "navigation", "items": [{"label": "Nieuws", "href": "/nieuws"}]}),
            json!({
                "_id": "p1",
                "_type": "page",
                "title": "Over ons",
                "slug": {"current": "over-ons"},
                "sections": [
                    {"_type": "divider", "_key": "a", "style": "line"},
                    {"_type": "unknownType", "_key": "b"},
                    {"_type": "quoteSection", "_key": "c", "quote": "X"}
                ]
            }),
        ])
        .await;

        let response = send(&state, get("/over-ons")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert_eq!(html.matches("class=\"page-section\"").count(), 2);
        assert!(!html.contains("data-key=\"b\""));
        assert!(html.contains("href=\"/nieuws\""));
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found_page() {
        let (state, _) = state_with(vec![]).await;
        let response = send(&state, get("/nieuws/bestaat-niet")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Pagina niet gevonden"));
    }

    #[tokio::test]
    async fn listings_hide_archived_and_drafts() {
        let (state, _) = state_with(vec![
            json!({"_id": "a1", "_type": "buurtActie", "title": "Snoeidag", "slug": {"current": "snoeidag"}}),
            json!({"_id": "a2", "_type": "buurtActie", "title": "Oud feest", "isArchived": true}),
            json!({"_id": "drafts.a3", "_type": "buurtActie", "title": "Geheim concept"}),
        ])
        .await;

        let html = body_text(send(&state, get("/buurt-acties")).await).await;
        assert!(html.contains("Snoeidag"));
        assert!(!html.contains("Oud feest"));
        assert!(!html.contains("Geheim concept"));

        let detail = send(&state, get("/buurt-acties/snoeidag")).await;
        assert_eq!(detail.status(), StatusCode::OK);
        assert!(body_text(detail).await.contains("name=\"buurtActieId\" value=\"a1\""));
    }

    #[tokio::test]
    async fn home_renders_without_any_content() {
        let (state, _) = state_with(vec![]).await;
        let response = send(&state, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Buurtvereniging"));
    }
}
