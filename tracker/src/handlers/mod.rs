//! HTTP handlers
//!
//! Read-only endpoints serving the generated feed documents.

pub mod feed;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use feed::{get_default_feed, get_feed_file, get_topic_feed, not_found};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the feed server's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(get_default_feed))
        .route("/rss", get(get_default_feed))
        .route("/feed.xml", get(get_default_feed))
        .route("/feeds/:topic", get(get_topic_feed))
        .route("/:file", get(get_feed_file))
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
