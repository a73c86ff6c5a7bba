//! Feed service
//!
//! Turns each stream's latest listing into RSS documents on disk.
//!
//! Every stream keeps its most recent window of rendered items. In merged
//! mode a publish from any stream rewrites the single shared document from
//! all windows; in per-stream mode only that stream's document is written.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Mutex;

use crate::adapters::storage::write_atomic;
use crate::domain::entities::site::{ICON_URL, NEWSWIRE_URL, PUBLISHER};
use crate::domain::entities::{sort_newest_first, Entry, FeedDocument, FeedItem, FeedMode};
use crate::domain::ports::NewswireApi;
use crate::error::PersistenceError;
use crate::feed::{render_body, to_rss};

const MERGED_NAME: &str = "all";

/// Where each feed document lives
#[derive(Debug, Clone)]
pub struct FeedLocator {
    mode: FeedMode,
    base_path: PathBuf,
    streams: Vec<String>,
}

impl FeedLocator {
    pub fn new(mode: FeedMode, base_path: impl Into<PathBuf>, streams: Vec<String>) -> Self {
        Self {
            mode,
            base_path: base_path.into(),
            streams,
        }
    }

    /// The document served at the root: the merged document, or the first
    /// stream's document in per-stream mode
    pub fn default_path(&self) -> PathBuf {
        match (self.mode, self.streams.first()) {
            (FeedMode::PerStream, Some(first)) => self.stream_path(first),
            _ => self.base_path.clone(),
        }
    }

    /// Path of a stream's own document; `None` in merged mode or for
    /// streams that are not configured
    pub fn topic_path(&self, topic: &str) -> Option<PathBuf> {
        match self.mode {
            FeedMode::PerStream if self.streams.iter().any(|s| s == topic) => {
                Some(self.stream_path(topic))
            }
            _ => None,
        }
    }

    /// Resolve a bare document file name such as `feed-music.xml`
    pub fn file_path(&self, file: &str) -> Option<PathBuf> {
        if self.mode != FeedMode::PerStream {
            return None;
        }
        self.streams
            .iter()
            .map(|s| self.stream_path(s))
            .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(file))
    }

    fn stream_path(&self, topic: &str) -> PathBuf {
        let stem = self
            .base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("feed");
        let ext = self
            .base_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("xml");
        self.base_path
            .with_file_name(format!("{}-{}.{}", stem, topic, ext))
    }
}

/// Channel metadata for one stream's document
pub fn stream_document(topic: &str, items: Vec<FeedItem>) -> FeedDocument {
    document(
        topic,
        format!("Rockstar Newswire ({})", topic),
        format!("Latest news from Rockstar Games for {}", topic),
        items,
    )
}

/// Channel metadata for the merged document
pub fn merged_document(topics: &[String], items: Vec<FeedItem>) -> FeedDocument {
    document(
        MERGED_NAME,
        "Rockstar Newswire".to_string(),
        format!("Latest news from Rockstar Games for {}", topics.join(", ")),
        items,
    )
}

fn document(name: &str, title: String, description: String, items: Vec<FeedItem>) -> FeedDocument {
    FeedDocument {
        name: name.to_string(),
        title,
        description,
        link: NEWSWIRE_URL.to_string(),
        language: "en".to_string(),
        image: ICON_URL.to_string(),
        copyright: format!("All rights reserved by {}", PUBLISHER),
        generator: "Rockstar Newswire RSS Generator".to_string(),
        updated: Utc::now(),
        items,
    }
}

/// Newest first, first occurrence of each id wins
fn merge_windows<'a>(windows: impl Iterator<Item = &'a Vec<FeedItem>>) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = windows.flatten().cloned().collect();
    sort_newest_first(&mut items);

    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.id.clone()));
    items
}

/// A listing rendered into feed items
#[derive(Debug, Clone, Default)]
pub struct RenderedListing {
    pub items: Vec<FeedItem>,
    /// Subtitle of every entry whose detail came back, keyed by entry id
    pub subtitles: HashMap<String, Option<String>>,
}

/// Service that synthesises and writes feed documents
pub struct FeedService<A>
where
    A: NewswireApi,
{
    api: Arc<A>,
    locator: FeedLocator,
    windows: Mutex<BTreeMap<String, Vec<FeedItem>>>,
}

impl<A> FeedService<A>
where
    A: NewswireApi,
{
    pub fn new(api: Arc<A>, locator: FeedLocator) -> Self {
        Self {
            api,
            locator,
            windows: Mutex::new(BTreeMap::new()),
        }
    }

    /// Render every entry, fetching details concurrently.
    ///
    /// An entry whose detail is missing gets its title as body; one bad
    /// entry never costs the rest of the document.
    pub async fn render_entries(&self, entries: &[Entry]) -> RenderedListing {
        let rendered = join_all(entries.iter().map(|entry| self.render_entry(entry))).await;

        let mut listing = RenderedListing::default();
        for (item, subtitle) in rendered {
            if let Some(subtitle) = subtitle {
                listing.subtitles.insert(item.id.clone(), subtitle);
            }
            listing.items.push(item);
        }
        listing
    }

    /// The feed item, plus the detail's subtitle when the detail was fetched
    async fn render_entry(&self, entry: &Entry) -> (FeedItem, Option<Option<String>>) {
        let (content, subtitle) = match self.api.get_entry_detail(&entry.id).await {
            Some(detail) => (render_body(&detail, &entry.title), Some(detail.subtitle)),
            None => {
                tracing::debug!("No detail for entry {}, using title as body", entry.id);
                (entry.title.clone(), None)
            }
        };

        let item = FeedItem {
            id: entry.id.clone(),
            title: entry.title.clone(),
            link: entry.link(),
            description: entry.title.clone(),
            content,
            author: PUBLISHER.to_string(),
            published: entry.published_at(),
            image: entry.preview_image.clone(),
        };
        (item, subtitle)
    }

    /// Replace `stream`'s window with `items` and rewrite the affected
    /// document. Returns the path written.
    pub async fn publish(&self, stream: &str, items: Vec<FeedItem>) -> Result<PathBuf, PersistenceError> {
        // Held through the write so merged rewrites never interleave
        let mut windows = self.windows.lock().await;
        windows.insert(stream.to_string(), items.clone());

        let (path, doc) = match self.locator.mode {
            FeedMode::Merged => {
                let doc = merged_document(&self.locator.streams, merge_windows(windows.values()));
                (self.locator.default_path(), doc)
            }
            FeedMode::PerStream => {
                let mut items = items;
                sort_newest_first(&mut items);
                (self.locator.stream_path(stream), stream_document(stream, items))
            }
        };

        write_document(&path, &doc).await?;
        tracing::info!(
            "Wrote {} with {} items",
            path.display(),
            doc.items.len()
        );
        Ok(path)
    }

    /// Snapshot of every stream's current window
    pub async fn windows(&self) -> BTreeMap<String, Vec<FeedItem>> {
        self.windows.lock().await.clone()
    }
}

async fn write_document(path: &Path, doc: &FeedDocument) -> Result<(), PersistenceError> {
    write_atomic(path, to_rss(doc).as_bytes()).await
}
