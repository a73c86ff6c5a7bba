//! JSON-file known-entry store
//!
//! The file is a flat object mapping entry id to the link it was first
//! seen at. It is loaded once at startup and rewritten in full on every
//! new id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::fs::write_atomic;
use crate::domain::ports::EntryStore;
use crate::error::PersistenceError;

pub struct JsonEntryStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonEntryStore {
    /// Load the store at `path`.
    ///
    /// A missing or unreadable file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path).await;
        tracing::info!("Loaded {} known entries from {}", entries.len(), path.display());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Copy of the current id -> link map
    #[cfg(test)]
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }
}

async fn load(path: &Path) -> BTreeMap<String, String> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!("Could not read {}: {}; starting empty", path.display(), e);
            return BTreeMap::new();
        }
    };

    if raw.trim().is_empty() {
        return BTreeMap::new();
    }

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("Corrupt known-entry file {}: {}; starting empty", path.display(), e);
        BTreeMap::new()
    })
}

#[async_trait]
impl EntryStore for JsonEntryStore {
    async fn is_known(&self, id: &str) -> bool {
        self.entries.lock().await.contains_key(id)
    }

    async fn record(&self, id: &str, url: &str) -> Result<bool, PersistenceError> {
        // Held across the write so concurrent records serialise
        let mut entries = self.entries.lock().await;
        if entries.contains_key(id) {
            return Ok(false);
        }

        entries.insert(id.to_string(), url.to_string());
        let json = serde_json::to_vec_pretty(&*entries)?;

        // Ids are never dropped; the next successful write carries this one too
        write_atomic(&self.path, &json).await?;

        tracing::debug!("Recorded entry {} -> {}", id, url);
        Ok(true)
    }
}
