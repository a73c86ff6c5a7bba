//! Feed handlers
//!
//! Documents are read from disk on every request, so a rewrite by a poller
//! is visible immediately.

use std::io::ErrorKind;
use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::AppState;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

async fn serve_document(path: &Path) -> Result<Response, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(xml) => Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::FeedNotReady),
        Err(e) => Err(AppError::Internal(format!("{}: {}", path.display(), e))),
    }
}

/// GET / | /rss | /feed.xml
pub async fn get_default_feed(State(state): State<AppState>) -> Result<Response, AppError> {
    serve_document(&state.locator.default_path()).await
}

/// GET /feeds/:topic
pub async fn get_topic_feed(
    State(state): State<AppState>,
    UrlPath(topic): UrlPath<String>,
) -> Result<Response, AppError> {
    let path = state
        .locator
        .topic_path(&topic)
        .ok_or_else(|| AppError::NotFound(format!("feed {}", topic)))?;
    serve_document(&path).await
}

/// GET /feed-<topic>.xml
pub async fn get_feed_file(
    State(state): State<AppState>,
    UrlPath(file): UrlPath<String>,
) -> Result<Response, AppError> {
    let path = state
        .locator
        .file_path(&file)
        .ok_or_else(|| AppError::NotFound(file.clone()))?;
    serve_document(&path).await
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
