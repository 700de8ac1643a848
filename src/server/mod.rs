//! HTTP transport
//!
//! Requests are independent: there is no shared state behind the router,
//! every handler works entirely from its own request body.

pub mod error;
pub mod forms;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Build the application router.
pub fn router(config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/add-watermark", post(routes::add_watermark))
        .route("/rotate-pdf", post(routes::rotate_pdf))
        .route("/add-page-numbers", post(routes::add_page_numbers))
        .route("/convert-images", post(routes::convert_images))
        .layer(DefaultBodyLimit::max(config.limits.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
