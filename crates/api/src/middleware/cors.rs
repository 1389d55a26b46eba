use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Public forms may be posted from other origins; only the methods the
/// router serves are allowed.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any)
}
