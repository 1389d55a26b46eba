//! Editorial studio API: content-type list, document lists, document forms
//! and the action toolbar. Everything but login requires a bearer token.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use buurt_core::auth::TOKEN_TTL_HOURS;
use buurt_core::editorial::{
    ContentType, DocumentForm, DocumentSummary, EditorialAction, Transition, CONTENT_TYPES,
};
use buurt_core::mutation::PatchOperations;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::StudioUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/studio/login", post(login))
        .route("/studio/types", get(types))
        .route(
            "/studio/types/{doc_type}/documents",
            get(list_documents).post(create_document),
        )
        .route("/studio/documents/{id}", get(document_form).patch(edit_document))
        .route("/studio/documents/{id}/actions/{action}", post(run_action))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActionRequest {
    confirm: bool,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let Some(credentials) = &state.config().studio else {
        tracing::warn!("studio login attempted but no editor account is configured");
        return Err(ApiError::Unauthorized);
    };
    credentials.verify(&request.username, &request.password)?;
    let token = state.tokens().issue(&request.username)?;
    tracing::info!(user = %request.username, "studio login");
    Ok(Json(json!({
        "token": token,
        "expiresIn": TOKEN_TTL_HOURS * 3600,
    })))
}

async fn types(_user: StudioUser) -> Json<&'static [ContentType]> {
    let types: &'static [ContentType] = &CONTENT_TYPES;
    Json(types)
}

async fn list_documents(
    _user: StudioUser,
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
) -> ApiResult<Json<Vec<DocumentSummary>>> {
    Ok(Json(state.editor().list(&doc_type).await?))
}

async fn create_document(
    _user: StudioUser,
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transition>)> {
    let fields = json_body(payload)?;
    let transition = state.editor().create_draft(&doc_type, fields).await?;
    Ok((StatusCode::CREATED, Json(transition)))
}

async fn document_form(
    _user: StudioUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentForm>> {
    Ok(Json(state.editor().form(&id).await?))
}

async fn edit_document(
    _user: StudioUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PatchOperations>, JsonRejection>,
) -> ApiResult<Json<Transition>> {
    let operations = json_body(payload)?;
    if operations.is_empty() {
        return Err(ApiError::BadRequest("no changes in patch".to_string()));
    }
    Ok(Json(state.editor().edit(&id, operations).await?))
}

async fn run_action(
    StudioUser(claims): StudioUser,
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Transition>> {
    let action = EditorialAction::parse(&action)
        .ok_or_else(|| ApiError::NotFound(format!("unknown action: {action}")))?;
    let request: ActionRequest = if body.is_empty() {
        ActionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };
    let transition = state.editor().run(action, &id, request.confirm).await?;
    tracing::info!(user = %claims.sub, ?action, document_id = %id, "studio action");
    Ok(Json(transition))
}
