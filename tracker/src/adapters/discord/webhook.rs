//! Discord webhook notifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::entities::site::{ICON_URL, NEWSWIRE_URL};
use crate::domain::entities::{Notification, TopicStream};
use crate::domain::ports::Notifier;
use crate::error::NotifyError;

/// Embed accent colour
const EMBED_COLOR: u32 = 15258703;
const EMBED_AUTHOR: &str = "Newswire";

#[derive(Debug, Serialize)]
pub(crate) struct WebhookPayload {
    username: String,
    avatar_url: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    author: EmbedAuthor,
    title: String,
    url: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor {
    name: &'static str,
    url: &'static str,
    icon_url: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedImage {
    url: String,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

pub struct DiscordNotifier {
    http: Client,
}

impl DiscordNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(
        &self,
        stream: &TopicStream,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let Some(webhook_url) = stream.webhook_url.as_deref() else {
            tracing::debug!("No webhook for {}, skipping entry {}", stream.name, notification.entry_id);
            return Ok(());
        };

        let response = self
            .http
            .post(webhook_url)
            .json(&build_payload(stream, notification))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Notified {} of entry {}", stream.name, notification.entry_id);
        Ok(())
    }
}

pub(crate) fn build_payload(stream: &TopicStream, notification: &Notification) -> WebhookPayload {
    WebhookPayload {
        username: stream.display.profile_name.clone(),
        avatar_url: stream.display.avatar_url.clone(),
        embeds: vec![Embed {
            author: EmbedAuthor {
                name: EMBED_AUTHOR,
                url: NEWSWIRE_URL,
                icon_url: ICON_URL,
            },
            title: notification.title.clone(),
            url: notification.link.clone(),
            description: notification.description(),
            color: EMBED_COLOR,
            image: notification
                .image
                .as_ref()
                .filter(|url| !url.is_empty())
                .map(|url| EmbedImage { url: url.clone() }),
            footer: EmbedFooter {
                text: notification.date.clone(),
            },
        }],
    }
}
