//! Credential Provider
//!
//! Holds the one persisted-query credential shared by every stream.
//!
//! State machine:
//! - `Idle`: nothing cached; the next `acquire` leads an acquisition
//! - `Acquiring`: an acquisition is running; later callers queue as waiters
//! - `Ready`: cached credential, returned immediately
//!
//! A failed or cancelled acquisition returns to `Idle`, so failures are
//! never cached.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::domain::entities::Credential;
use crate::domain::ports::TokenSource;
use crate::error::TokenError;

type Waiter = oneshot::Sender<Result<Credential, TokenError>>;

enum State {
    Idle,
    Acquiring(Vec<Waiter>),
    Ready(Credential),
}

pub struct CredentialProvider<T>
where
    T: TokenSource,
{
    source: Arc<T>,
    timeout: Duration,
    state: Mutex<State>,
}

impl<T> CredentialProvider<T>
where
    T: TokenSource,
{
    pub fn new(source: Arc<T>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            state: Mutex::new(State::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached credential, acquiring one first if needed.
    ///
    /// Concurrent callers share a single acquisition and all receive its
    /// result.
    pub async fn acquire(&self) -> Result<Credential, TokenError> {
        let waiter = {
            let mut state = self.lock();
            match &mut *state {
                State::Ready(credential) => return Ok(credential.clone()),
                State::Acquiring(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                State::Idle => {
                    *state = State::Acquiring(Vec::new());
                    None
                }
            }
        };

        match waiter {
            Some(rx) => {
                tracing::debug!("Joining in-flight token acquisition");
                rx.await.unwrap_or(Err(TokenError::Abandoned))
            }
            None => self.lead().await,
        }
    }

    async fn lead(&self) -> Result<Credential, TokenError> {
        let guard = LeaderGuard {
            state: &self.state,
            finished: false,
        };

        tracing::info!("Acquiring persisted-query token");
        let result = match tokio::time::timeout(self.timeout, self.source.fetch_token()).await {
            Ok(result) => result,
            Err(_) => Err(TokenError::Timeout(self.timeout.as_secs())),
        };

        if let Err(e) = &result {
            tracing::warn!("Token acquisition failed: {}", e);
        }

        guard.finish(&result);
        result
    }

    /// Drop `stale` so the next `acquire` fetches a new credential.
    ///
    /// A credential that was already replaced by someone else is left alone.
    pub fn invalidate(&self, stale: &Credential) {
        let mut state = self.lock();
        if matches!(&*state, State::Ready(current) if current == stale) {
            tracing::info!("Discarding stale persisted-query token");
            *state = State::Idle;
        }
    }
}

/// Settles the `Acquiring` state even if the leader's future is dropped
struct LeaderGuard<'a> {
    state: &'a Mutex<State>,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(mut self, result: &Result<Credential, TokenError>) {
        self.finished = true;

        let next = match result {
            Ok(credential) => State::Ready(credential.clone()),
            Err(_) => State::Idle,
        };
        let previous = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            mem::replace(&mut *state, next)
        };

        if let State::Acquiring(waiters) = previous {
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Dropping the senders wakes every waiter with `Abandoned`
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(&*state, State::Acquiring(_)) {
            *state = State::Idle;
        }
    }
}
