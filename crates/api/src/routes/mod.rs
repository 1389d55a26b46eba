pub mod health;
pub mod intake;
pub mod site;
pub mod studio;

use axum::Router;

use crate::middleware::limit::body_limit_layer;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config().max_body_bytes;
    Router::new()
        .merge(health::routes())
        .merge(intake::routes())
        .merge(studio::routes())
        .merge(site::routes())
        .layer(body_limit_layer(max_body_bytes))
        .with_state(state)
}
