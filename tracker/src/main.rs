//! Rockstar Newswire Tracker
//!
//! Polls the Rockstar newswire for new posts per configured topic, announces
//! them through a Discord webhook and publishes RSS feeds of the latest posts.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod integration_tests;

use adapters::{BrowserTokenSource, DiscordNotifier, GraphClient, JsonEntryStore};
use app::{CredentialProvider, FeedLocator, FeedService, PollerService};
use config::Config;
use domain::entities::site::{GRAPH_URL, NEWSWIRE_URL};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<FeedLocator>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,newswire_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rockstar Newswire Tracker...");

    // Load configuration; any problem here is fatal
    let config = Config::from_env().context("Failed to load configuration")?;
    let streams = config.topic_streams()?;

    if config.enable_discord && config.webhook().is_none() {
        tracing::warn!("Discord is enabled but no webhook URL is set; notifications are off");
    }
    if config.webhook().is_none() && !config.enable_rss {
        tracing::warn!("Neither Discord nor RSS output is enabled; only new entries will be recorded");
    }

    // Create adapters
    let api = Arc::new(
        GraphClient::new(GRAPH_URL, Duration::from_secs(config.request_timeout_secs))
            .context("Failed to build content API client")?,
    );
    let credentials = Arc::new(CredentialProvider::new(
        Arc::new(BrowserTokenSource::new(NEWSWIRE_URL)),
        Duration::from_secs(config.token_timeout_secs),
    ));
    let store = Arc::new(JsonEntryStore::open(&config.known_entries_path).await);
    let notifier = match config.webhook() {
        Some(_) => Some(Arc::new(
            DiscordNotifier::new(WEBHOOK_TIMEOUT).context("Failed to build webhook client")?,
        )),
        None => None,
    };

    // Create application services
    let locator = FeedLocator::new(
        config.feed_mode(),
        config.feed_path.clone(),
        streams.iter().map(|s| s.name.clone()).collect(),
    );
    let feeds = config
        .enable_rss
        .then(|| Arc::new(FeedService::new(api.clone(), locator.clone())));

    for stream in streams {
        let mut poller = PollerService::new(
            stream,
            credentials.clone(),
            api.clone(),
            store.clone(),
            config.check_limit,
        );
        if let Some(notifier) = &notifier {
            poller = poller.with_notifier(notifier.clone());
        }
        if let Some(feeds) = &feeds {
            poller = poller.with_feeds(feeds.clone());
        }
        tokio::spawn(Arc::new(poller).run());
    }

    if !config.enable_rss {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        tracing::info!("Shutting down");
        return Ok(());
    }

    // Start server
    let state = AppState {
        locator: Arc::new(locator),
    };
    let app = handlers::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        "Serving {:?} feed(s) on {}",
        config.feed_mode(),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .context("Server error")?;

    tracing::info!("Shutting down");
    Ok(())
}
