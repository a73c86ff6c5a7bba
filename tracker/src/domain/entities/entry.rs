//! Newswire entries
//!
//! Entries are fetched fresh every cycle; only their ids outlive a cycle
//! (in the known-entry store).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::content::ContentNode;
use super::site::resolve_site_url;
use super::topic::DateFormat;

/// A content item from the listing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Deduplication key
    pub id: String,
    pub title: String,
    /// Site-relative URL as returned by the API
    pub url: String,
    /// Creation timestamp exactly as the API reported it
    pub created: String,
    pub tags: Vec<String>,
    pub preview_image: Option<String>,
}

impl Entry {
    /// Absolute link to the entry on the site
    pub fn link(&self) -> String {
        resolve_site_url(&self.url)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created)
    }

    /// Creation date in the given format, or the raw value if it can't be parsed
    pub fn display_date(&self, format: DateFormat) -> String {
        match self.published_at() {
            Some(ts) => ts.format(format.pattern()).to_string(),
            None => self.created.clone(),
        }
    }
}

/// Full-detail payload for a single entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDetail {
    pub title: String,
    pub subtitle: Option<String>,
    /// Body content tree; absent when the post has no structured payload
    pub content: Option<ContentNode>,
}

/// Parse an API timestamp: RFC 3339 first, then naive `YYYY-MM-DD HH:MM:SS` as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
