use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use buurt_core::auth::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated studio editor, taken from the bearer token.
#[derive(Debug, Clone)]
pub struct StudioUser(pub Claims);

impl FromRequestParts<AppState> for StudioUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;
        let claims = state.tokens().verify(bearer.token()).map_err(|err| {
            tracing::debug!(error = %err, "rejected studio token");
            ApiError::Unauthorized
        })?;
        Ok(StudioUser(claims))
    }
}
