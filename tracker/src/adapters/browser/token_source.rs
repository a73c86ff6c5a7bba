//! Token discovery through a headless browser
//!
//! The list query hash is never published; the newswire page sends it with
//! its own first list request. We load the page with request interception
//! on, read the hash off that request and abort it.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use url::Url;

use crate::adapters::graph::client::LIST_OPERATION;
use crate::domain::entities::Credential;
use crate::domain::ports::TokenSource;
use crate::error::TokenError;

/// Launches a fresh browser per acquisition
pub struct BrowserTokenSource {
    page_url: String,
}

impl BrowserTokenSource {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
        }
    }

    /// Resume paused requests until one carries the list hash
    async fn intercept(&self, page: &Page) -> Result<String, TokenError> {
        let mut paused = page.event_listener::<EventRequestPaused>().await?;

        page.execute(
            EnableParams::builder()
                .pattern(RequestPattern::builder().url_pattern("*").build())
                .build(),
        )
        .await?;

        let nav_page = page.clone();
        let url = self.page_url.clone();
        let navigation = tokio::spawn(async move {
            if let Err(e) = nav_page.goto(url.as_str()).await {
                tracing::debug!("Navigation to {} ended: {}", url, e);
            }
        });

        let mut found = None;
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();

            match extract_persisted_hash(&event.request.url, LIST_OPERATION) {
                Ok(Some(hash)) => {
                    // The page's own request would spend the token for nothing
                    if let Err(e) = page
                        .execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                        .await
                    {
                        tracing::debug!("Failed to abort intercepted request: {}", e);
                    }
                    found = Some(hash);
                    break;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Ignoring request: {}", e),
            }

            if let Err(e) = page.execute(ContinueRequestParams::new(request_id)).await {
                tracing::debug!("Failed to resume request: {}", e);
            }
        }

        navigation.abort();
        found.ok_or_else(|| TokenError::NotObserved(LIST_OPERATION.to_string()))
    }
}

#[async_trait]
impl TokenSource for BrowserTokenSource {
    async fn fetch_token(&self) -> Result<Credential, TokenError> {
        let config = BrowserConfig::builder().build().map_err(TokenError::Launch)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| TokenError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Browser launched, loading {}", self.page_url);

        let result = match browser.new_page("about:blank").await {
            Ok(page) => self.intercept(&page).await,
            Err(e) => Err(e.into()),
        };

        // Always tear the browser down, whatever the outcome
        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Browser did not exit cleanly: {}", e);
        }
        handler_task.abort();

        let hash = result?;
        tracing::info!("Observed fresh persisted-query token");
        Ok(Credential::new(hash))
    }
}

/// Pull the persisted-query hash from a request URL for the named operation.
///
/// `Ok(None)` means the request is not the operation we are looking for.
pub(crate) fn extract_persisted_hash(
    request_url: &str,
    operation: &str,
) -> Result<Option<String>, TokenError> {
    let Ok(url) = Url::parse(request_url) else {
        return Ok(None);
    };

    let mut operation_name = None;
    let mut extensions = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "operationName" => operation_name = Some(value.into_owned()),
            "extensions" => extensions = Some(value.into_owned()),
            _ => {}
        }
    }

    if operation_name.as_deref() != Some(operation) {
        return Ok(None);
    }

    let extensions = extensions
        .ok_or_else(|| TokenError::Malformed(format!("{} request has no extensions", operation)))?;
    let parsed: Value = serde_json::from_str(&extensions)
        .map_err(|e| TokenError::Malformed(format!("extensions are not JSON: {}", e)))?;

    parsed
        .pointer("/persistedQuery/sha256Hash")
        .and_then(Value::as_str)
        .filter(|hash| !hash.is_empty())
        .map(|hash| Some(hash.to_string()))
        .ok_or_else(|| TokenError::Malformed("extensions carry no sha256Hash".to_string()))
}
