//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::entities::{Credential, Entry, EntryDetail, Notification, TopicStream};
use crate::domain::ports::{EntryStore, NewswireApi, Notifier, TokenSource};
use crate::error::{ApiError, NotifyError, PersistenceError, TokenError};

// ============================================================================
// Mock Content API
// ============================================================================

/// Scripted content API.
///
/// List results are served in the order they were queued; once the queue
/// is drained every further call returns an empty page.
#[derive(Default)]
pub struct MockNewswireApi {
    lists: Arc<RwLock<VecDeque<Result<Vec<Entry>, ApiError>>>>,
    details: Arc<RwLock<HashMap<String, EntryDetail>>>,
    list_delay: Option<Duration>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    credentials_seen: Arc<RwLock<Vec<Credential>>>,
}

impl MockNewswireApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next list call
    pub fn with_list(self, result: Result<Vec<Entry>, ApiError>) -> Self {
        self.lists.write().unwrap().push_back(result);
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn with_detail(self, id: &str, detail: EntryDetail) -> Self {
        self.details.write().unwrap().insert(id.to_string(), detail);
        self
    }

    /// Detail with only a subtitle set
    pub fn with_subtitle(self, id: &str, subtitle: &str) -> Self {
        let detail = EntryDetail {
            title: String::new(),
            subtitle: Some(subtitle.to_string()),
            content: None,
        };
        self.with_detail(id, detail)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Credentials passed to list calls, in call order
    pub fn credentials_seen(&self) -> Vec<Credential> {
        self.credentials_seen.read().unwrap().clone()
    }
}

#[async_trait]
impl NewswireApi for MockNewswireApi {
    async fn list_entries(
        &self,
        _topic_id: Option<u32>,
        _page: u32,
        credential: &Credential,
    ) -> Result<Vec<Entry>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.credentials_seen.write().unwrap().push(credential.clone());

        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.lists.write().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_entry_detail(&self, entry_id: &str) -> Option<EntryDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.read().unwrap().get(entry_id).cloned()
    }
}

// ============================================================================
// Mock Token Source
// ============================================================================

/// Hands out `token-1`, `token-2`, ... one per call
#[derive(Default)]
pub struct MockTokenSource {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the first `n` calls
    pub fn failing_times(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn fetch_token(&self) -> Result<Credential, TokenError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TokenError::NotObserved("NewswireList".to_string()));
        }

        Ok(Credential::new(format!("token-{}", n)))
    }
}

// ============================================================================
// In-Memory Entry Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryEntryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    /// Ids recorded through the port, in order
    recorded: Arc<RwLock<Vec<String>>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a known id
    pub fn with_known(self, id: &str) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(id.to_string(), format!("https://www.rockstargames.com/{}", id));
        self
    }

    /// Number of successful `record` calls
    pub fn records(&self) -> usize {
        self.recorded.read().unwrap().len()
    }

    pub fn recorded_ids(&self) -> Vec<String> {
        self.recorded.read().unwrap().clone()
    }

    pub fn url_of(&self, id: &str) -> Option<String> {
        self.entries.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn is_known(&self, id: &str) -> bool {
        self.entries.read().unwrap().contains_key(id)
    }

    async fn record(&self, id: &str, url: &str) -> Result<bool, PersistenceError> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(id) {
            return Ok(false);
        }
        entries.insert(id.to_string(), url.to_string());
        self.recorded.write().unwrap().push(id.to_string());
        Ok(true)
    }
}

// ============================================================================
// Recording Notifier
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery is rejected with a 500
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Successfully delivered notifications
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        _stream: &TopicStream,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::Status {
                status: 500,
                message: "webhook down".to_string(),
            });
        }
        self.sent.write().unwrap().push(notification.clone());
        Ok(())
    }
}
