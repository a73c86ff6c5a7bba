//! Syndication feed documents
//!
//! A `FeedDocument` is the format-neutral form of one RSS document; see
//! `crate::feed::syndication` for serialisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How documents are laid out across topic streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMode {
    /// One document aggregating every stream
    Merged,
    /// One document per stream
    PerStream,
}

/// One rendered entry inside a feed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    /// Rendered body markup
    pub content: String,
    pub author: String,
    pub published: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// Reverse chronological order; undated items sink to the bottom and
/// ties keep their relative order
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(|a, b| b.published.cmp(&a.published));
}

/// A complete feed document with channel metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedDocument {
    /// Topic name, or "all" for the merged document
    pub name: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,
    pub image: String,
    pub copyright: String,
    pub generator: String,
    pub updated: DateTime<Utc>,
    pub items: Vec<FeedItem>,
}
