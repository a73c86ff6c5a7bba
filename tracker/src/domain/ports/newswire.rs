//! Content API port trait
//!
//! Defines the interface for querying the newswire content API.

use async_trait::async_trait;

use crate::domain::entities::{Credential, Entry, EntryDetail};
use crate::error::ApiError;

/// Client for the newswire content API
#[async_trait]
pub trait NewswireApi: Send + Sync {
    /// List one page of entries, newest first.
    ///
    /// `topic_id` of `None` lists every topic. A stale `credential` is
    /// reported as [`ApiError::StaleCredential`]; the caller decides whether
    /// to re-acquire and retry.
    async fn list_entries(
        &self,
        topic_id: Option<u32>,
        page: u32,
        credential: &Credential,
    ) -> Result<Vec<Entry>, ApiError>;

    /// Fetch the full-detail payload for one entry.
    ///
    /// Best effort: any failure is logged by the implementation and
    /// reported as `None`.
    async fn get_entry_detail(&self, entry_id: &str) -> Option<EntryDetail>;
}
