use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use buurt_core::auth::AuthError;
use buurt_core::editorial::EditorialError;
use buurt_core::intake::IntakeError;
use buurt_core::store::StoreError;
use serde_json::json;

use crate::views;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// JSON API error. The body is `{error, type, statusCode}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Editorial(#[from] EditorialError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

fn internal(err: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internalError",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn store_parts(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "notFound", err.to_string()),
        StoreError::AlreadyExists(_) | StoreError::RevisionConflict { .. } => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        StoreError::Invalid(_) | StoreError::Patch(_) => {
            (StatusCode::BAD_REQUEST, "badRequest", err.to_string())
        }
        StoreError::Database(_) | StoreError::Upstream(_) => internal(err),
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            ApiError::Store(err) => store_parts(err),
            ApiError::Editorial(err) => match err {
                EditorialError::Disabled { .. } | EditorialError::SlugInUse { .. } => {
                    (StatusCode::CONFLICT, "conflict", err.to_string())
                }
                EditorialError::NotFound(_) => (StatusCode::NOT_FOUND, "notFound", err.to_string()),
                EditorialError::InvalidId(_) | EditorialError::UnknownType(_) => {
                    (StatusCode::BAD_REQUEST, "badRequest", err.to_string())
                }
                EditorialError::ConfirmationRequired(prompt) => (
                    StatusCode::BAD_REQUEST,
                    "confirmationRequired",
                    prompt.clone(),
                ),
                EditorialError::SlugNotObserved(_) => internal(err),
                EditorialError::Store(inner) => store_parts(inner),
            },
            ApiError::Intake(err) if err.is_client_error() => (
                StatusCode::BAD_REQUEST,
                "badRequest",
                err.user_message().to_string(),
            ),
            ApiError::Intake(err) => {
                tracing::error!(error = %err, "intake failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    err.user_message().to_string(),
                )
            }
            ApiError::Auth(AuthError::BadHash(_)) => internal(self),
            ApiError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid credentials".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        let body = json!({
            "error": message,
            "type": error_type,
            "statusCode": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error from a public HTML page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(views::error_page("Pagina niet gevonden").into_string()),
            )
                .into_response(),
            PageError::Store(err) => {
                tracing::error!(error = %err, "page fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page("Er ging iets mis").into_string()),
                )
                    .into_response()
            }
        }
    }
}

pub type PageResult<T> = Result<T, PageError>;
