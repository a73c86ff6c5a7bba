//! Notification port trait

use async_trait::async_trait;

use crate::domain::entities::{Notification, TopicStream};
use crate::error::NotifyError;

/// Delivers new-entry notifications for a stream
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver once; callers log failures and never retry
    async fn notify(
        &self,
        stream: &TopicStream,
        notification: &Notification,
    ) -> Result<(), NotifyError>;
}
