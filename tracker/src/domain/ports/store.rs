//! Known-entry store port trait

use async_trait::async_trait;

use crate::error::PersistenceError;

/// Append-only set of entry ids that have already been notified
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Whether `id` has been recorded
    async fn is_known(&self, id: &str) -> bool;

    /// Record `id` with the URL it was first seen at.
    ///
    /// Returns `Ok(false)` without touching storage if `id` is already
    /// known. Otherwise the full set is persisted before returning. A
    /// failed write is returned as an error, but `id` stays known.
    async fn record(&self, id: &str, url: &str) -> Result<bool, PersistenceError>;
}
