use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use buurt_core::intake::messages;
use buurt_core::intake::{ContactRequest, RegistrationRequest};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact))
        .route("/api/registration", post(registration))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let sent = state.contact().submit(body(payload)?).await?;
    Ok(Json(json!({ "success": true, "id": sent.id })))
}

async fn registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let registered = state.registrations().submit(body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": messages::REGISTERED,
            "id": registered.id,
        })),
    ))
}
