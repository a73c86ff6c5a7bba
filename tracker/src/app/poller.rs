//! Poller Service
//!
//! One poller per topic stream. Each cycle:
//! 1. acquires the shared credential
//! 2. lists page 1 (re-acquiring and retrying once on a stale credential)
//! 3. hands the listing to the feed service, if feeds are enabled
//! 4. compares the newest entries against the known-entry store and
//!    notifies for each unseen one
//!
//! A cycle's failure is logged and contained; the next tick starts fresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::{interval, MissedTickBehavior};

use crate::app::credentials::CredentialProvider;
use crate::app::feed_service::FeedService;
use crate::domain::entities::{Credential, Entry, Notification, TopicStream};
use crate::domain::ports::{EntryStore, NewswireApi, Notifier, TokenSource};
use crate::error::{ApiError, PollError};

const FIRST_PAGE: u32 = 1;

/// Where a stream's cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    FetchingToken,
    Listing,
    StaleToken,
    Comparing,
    Notifying,
}

/// How a cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    /// The previous cycle was still running
    Skipped,
    Failed(PollError),
    Completed { listed: usize, new_entries: usize },
}

pub struct PollerService<A, T, S, N>
where
    A: NewswireApi,
    T: TokenSource,
    S: EntryStore,
    N: Notifier,
{
    stream: TopicStream,
    credentials: Arc<CredentialProvider<T>>,
    api: Arc<A>,
    store: Arc<S>,
    notifier: Option<Arc<N>>,
    feeds: Option<Arc<FeedService<A>>>,
    check_limit: usize,
    in_flight: AtomicBool,
    state: Mutex<PollState>,
}

/// Clears the in-flight flag and returns to `Idle` however the cycle ends
struct CycleGuard<'a> {
    in_flight: &'a AtomicBool,
    state: &'a Mutex<PollState>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PollState::Idle;
        self.in_flight.store(false, Ordering::Release);
    }
}

impl<A, T, S, N> PollerService<A, T, S, N>
where
    A: NewswireApi + 'static,
    T: TokenSource + 'static,
    S: EntryStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        stream: TopicStream,
        credentials: Arc<CredentialProvider<T>>,
        api: Arc<A>,
        store: Arc<S>,
        check_limit: usize,
    ) -> Self {
        Self {
            stream,
            credentials,
            api,
            store,
            notifier: None,
            feeds: None,
            check_limit: check_limit.max(1),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(PollState::Idle),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<N>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_feeds(mut self, feeds: Arc<FeedService<A>>) -> Self {
        self.feeds = Some(feeds);
        self
    }

    pub fn state(&self) -> PollState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: PollState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Tick forever: immediately, then every refresh interval
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.stream.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Polling {} every {}s",
            self.stream.name,
            self.stream.refresh_interval.as_secs()
        );

        loop {
            ticker.tick().await;
            match self.run_cycle().await {
                CycleOutcome::Skipped => tracing::debug!(
                    "{}: previous cycle still running ({:?}), skipping",
                    self.stream.name,
                    self.state()
                ),
                CycleOutcome::Failed(e) => {
                    tracing::error!("{}: cycle failed: {}", self.stream.name, e)
                }
                CycleOutcome::Completed { listed, new_entries } => tracing::info!(
                    "{}: cycle done, {} listed, {} new",
                    self.stream.name,
                    listed,
                    new_entries
                ),
            }
        }
    }

    /// Run one cycle unless one is already in flight
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return CycleOutcome::Skipped;
        }
        let _guard = CycleGuard {
            in_flight: &self.in_flight,
            state: &self.state,
        };

        let entries = match self.fetch_latest().await {
            Ok(entries) => entries,
            Err(e) => return CycleOutcome::Failed(e),
        };

        // Subtitles the feed already fetched
        let mut subtitles = HashMap::new();
        if let Some(feeds) = &self.feeds {
            let listing = feeds.render_entries(&entries).await;
            subtitles = listing.subtitles;
            if let Err(e) = feeds.publish(&self.stream.name, listing.items).await {
                tracing::error!("{}: failed to write feed: {}", self.stream.name, e);
            }
        }

        let new_entries = self.detect(&entries, &subtitles).await;
        CycleOutcome::Completed {
            listed: entries.len(),
            new_entries,
        }
    }

    /// List page 1, retrying exactly once after a stale credential
    async fn fetch_latest(&self) -> Result<Vec<Entry>, PollError> {
        self.set_state(PollState::FetchingToken);
        let credential = self.credentials.acquire().await?;

        self.set_state(PollState::Listing);
        match self.list(&credential).await {
            Err(ApiError::StaleCredential) => {
                tracing::warn!("{}: token is stale, re-acquiring", self.stream.name);
                self.set_state(PollState::StaleToken);
                self.credentials.invalidate(&credential);
                let fresh = self.credentials.acquire().await?;

                self.set_state(PollState::Listing);
                // A second stale signal is returned as-is and ends the cycle
                Ok(self.list(&fresh).await?)
            }
            other => Ok(other?),
        }
    }

    async fn list(&self, credential: &Credential) -> Result<Vec<Entry>, ApiError> {
        self.api
            .list_entries(self.stream.topic_id, FIRST_PAGE, credential)
            .await
    }

    /// Record and announce unseen entries among the newest `check_limit`,
    /// returning how many were new.
    ///
    /// Oldest first, so notifications arrive in publication order.
    async fn detect(
        &self,
        entries: &[Entry],
        subtitles: &HashMap<String, Option<String>>,
    ) -> usize {
        self.set_state(PollState::Comparing);

        let newest = &entries[..entries.len().min(self.check_limit)];
        let mut found = 0;

        for entry in newest.iter().rev() {
            if self.store.is_known(&entry.id).await {
                continue;
            }

            let link = entry.link();
            tracing::info!("{}: new entry {} \"{}\"", self.stream.name, entry.id, entry.title);

            match self.store.record(&entry.id, &link).await {
                Ok(true) => {}
                // Another stream sharing the store got there first
                Ok(false) => continue,
                // Still known in memory and announced as usual
                Err(e) => {
                    tracing::error!("{}: failed to persist {}: {}", self.stream.name, entry.id, e)
                }
            }

            if let Some(notifier) = &self.notifier {
                self.set_state(PollState::Notifying);
                let notification = self.build_notification(entry, link, subtitles).await;
                self.dispatch(notifier.clone(), notification);
                self.set_state(PollState::Comparing);
            }
            found += 1;
        }

        found
    }

    async fn build_notification(
        &self,
        entry: &Entry,
        link: String,
        subtitles: &HashMap<String, Option<String>>,
    ) -> Notification {
        let subtitle = match subtitles.get(&entry.id) {
            Some(subtitle) => subtitle.clone(),
            None => self
                .api
                .get_entry_detail(&entry.id)
                .await
                .and_then(|detail| detail.subtitle),
        };

        Notification {
            entry_id: entry.id.clone(),
            topic: self.stream.name.clone(),
            title: entry.title.clone(),
            link,
            image: entry.preview_image.clone(),
            date: entry.display_date(self.stream.display.date_format),
            tags: entry.tags.clone(),
            subtitle,
        }
    }

    /// Fire and forget; delivery failures are logged only
    fn dispatch(&self, notifier: Arc<N>, notification: Notification) {
        let stream = self.stream.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&stream, &notification).await {
                tracing::warn!(
                    "{}: notification for {} failed: {}",
                    stream.name,
                    notification.entry_id,
                    e
                );
            }
        });
    }
}
