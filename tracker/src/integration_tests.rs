//! Integration tests for the tracker pipeline
//!
//! Real known-entry store, feed writer and HTTP router; only the network
//! ports (content API, token source, webhook) are mocked.
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::adapters::JsonEntryStore;
    use crate::app::poller::CycleOutcome;
    use crate::app::{CredentialProvider, FeedLocator, FeedService, PollerService};
    use crate::domain::entities::FeedMode;
    use crate::domain::ports::EntryStore;
    use crate::error::ApiError;
    use crate::handlers::router;
    use crate::test_utils::{
        test_detail, test_entry, test_stream, MockNewswireApi, MockTokenSource, RecordingNotifier,
    };
    use crate::AppState;

    type Poller =
        PollerService<MockNewswireApi, MockTokenSource, JsonEntryStore, RecordingNotifier>;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    /// Fresh store, newest entry "42": notified with an absolute link and
    /// remembered across a restart
    #[tokio::test]
    async fn new_entry_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("newswire.json");

        let mut entry = test_entry("42", "Patch Notes");
        entry.url = "/news/42".to_string();
        let api = Arc::new(MockNewswireApi::new().with_list(Ok(vec![entry])));
        let source = Arc::new(MockTokenSource::new());
        let store = Arc::new(JsonEntryStore::open(&store_path).await);
        let notifier = Arc::new(RecordingNotifier::new());

        let poller: Poller = PollerService::new(
            test_stream("latest"),
            Arc::new(CredentialProvider::new(source, Duration::from_secs(5))),
            api,
            store.clone(),
            1,
        )
        .with_notifier(notifier.clone());

        poller.run_cycle().await;
        settle().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].link, "https://www.rockstargames.com/news/42");
        assert!(store.is_known("42").await);

        let reopened = JsonEntryStore::open(&store_path).await;
        assert!(reopened.is_known("42").await);
    }

    /// A second poll of the same listing sends nothing and leaves the file alone
    #[tokio::test]
    async fn repeated_listing_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("newswire.json");

        let api = Arc::new(
            MockNewswireApi::new()
                .with_list(Ok(vec![test_entry("1", "One")]))
                .with_list(Ok(vec![test_entry("1", "One")])),
        );
        let store = Arc::new(JsonEntryStore::open(&store_path).await);
        let notifier = Arc::new(RecordingNotifier::new());
        let poller: Poller = PollerService::new(
            test_stream("latest"),
            Arc::new(CredentialProvider::new(
                Arc::new(MockTokenSource::new()),
                Duration::from_secs(5),
            )),
            api,
            store.clone(),
            1,
        )
        .with_notifier(notifier.clone());

        poller.run_cycle().await;
        let after_first = std::fs::read_to_string(&store_path).unwrap();
        poller.run_cycle().await;
        settle().await;

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(std::fs::read_to_string(&store_path).unwrap(), after_first);
    }

    /// Two streams share one token acquisition, one store and one merged feed
    #[tokio::test]
    async fn streams_share_token_store_and_feed() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feed.xml");

        let dated = |id: &str, created: &str| {
            let mut entry = test_entry(id, &id.to_uppercase());
            entry.created = created.to_string();
            entry
        };

        // Each stream lists through its own client; details go through the feed's
        let api_gta = Arc::new(MockNewswireApi::new().with_list(Ok(vec![
            dated("a3", "2024-01-03 00:00:00"),
            dated("a1", "2024-01-01 00:00:00"),
        ])));
        let api_music =
            Arc::new(MockNewswireApi::new().with_list(Ok(vec![dated("b2", "2024-01-02 00:00:00")])));
        let detail_api =
            Arc::new(MockNewswireApi::new().with_detail("a3", test_detail("A3", "<p>three</p>")));

        let source = Arc::new(MockTokenSource::new().with_delay(Duration::from_millis(20)));
        let credentials = Arc::new(CredentialProvider::new(source.clone(), Duration::from_secs(5)));
        let store = Arc::new(JsonEntryStore::open(dir.path().join("newswire.json")).await);
        let locator = FeedLocator::new(
            FeedMode::Merged,
            &feed_path,
            vec!["gta_online".to_string(), "music".to_string()],
        );
        let feeds = Arc::new(FeedService::new(detail_api, locator.clone()));

        let gta: Poller = PollerService::new(
            test_stream("gta_online"),
            credentials.clone(),
            api_gta,
            store.clone(),
            1,
        )
        .with_feeds(feeds.clone());
        let music: Poller = PollerService::new(
            test_stream("music"),
            credentials.clone(),
            api_music,
            store.clone(),
            1,
        )
        .with_feeds(feeds.clone());

        let (first, second) = tokio::join!(gta.run_cycle(), music.run_cycle());
        assert!(matches!(first, CycleOutcome::Completed { new_entries: 1, .. }));
        assert!(matches!(second, CycleOutcome::Completed { new_entries: 1, .. }));

        // both streams needed a token at once; one acquisition served both
        assert_eq!(source.calls(), 1);
        assert!(store.is_known("a3").await);
        assert!(store.is_known("b2").await);
        assert!(!store.is_known("a1").await);

        let xml = std::fs::read_to_string(&feed_path).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let ids: Vec<&str> = channel
            .items()
            .iter()
            .map(|i| i.guid().unwrap().value())
            .collect();
        assert_eq!(ids, vec!["a3", "b2", "a1"]);
        assert_eq!(channel.items()[0].content(), Some("<p>three</p><br/>"));
        assert_eq!(channel.items()[1].content(), Some("B2"));

        let app = router(AppState {
            locator: Arc::new(locator),
        });
        let response = app
            .oneshot(Request::builder().uri("/rss").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), xml.as_bytes());
    }

    /// A stale token mid-run is replaced once and the cycle still completes
    #[tokio::test]
    async fn stale_token_recovers_within_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(
            MockNewswireApi::new()
                .with_list(Err(ApiError::StaleCredential))
                .with_list(Ok(vec![test_entry("8", "Eight")])),
        );
        let source = Arc::new(MockTokenSource::new());
        let store = Arc::new(JsonEntryStore::open(dir.path().join("newswire.json")).await);

        let poller: Poller = PollerService::new(
            test_stream("latest"),
            Arc::new(CredentialProvider::new(source.clone(), Duration::from_secs(5))),
            api.clone(),
            store.clone(),
            1,
        );

        let outcome = poller.run_cycle().await;

        assert!(matches!(outcome, CycleOutcome::Completed { new_entries: 1, .. }));
        assert_eq!(api.list_calls(), 2);
        assert_eq!(source.calls(), 2);
        assert!(store.is_known("8").await);
    }

    /// An unwritable store file still announces a new entry exactly once
    #[tokio::test]
    async fn unwritable_store_still_notifies_once() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("newswire.json");
        std::fs::create_dir(&store_path).unwrap();
        std::fs::write(store_path.join("child"), "x").unwrap();

        let api = Arc::new(
            MockNewswireApi::new()
                .with_list(Ok(vec![test_entry("42", "Patch Notes")]))
                .with_list(Ok(vec![test_entry("42", "Patch Notes")])),
        );
        let store = Arc::new(JsonEntryStore::open(&store_path).await);
        let notifier = Arc::new(RecordingNotifier::new());
        let poller: Poller = PollerService::new(
            test_stream("latest"),
            Arc::new(CredentialProvider::new(
                Arc::new(MockTokenSource::new()),
                Duration::from_secs(5),
            )),
            api,
            store.clone(),
            1,
        )
        .with_notifier(notifier.clone());

        let first = poller.run_cycle().await;
        let second = poller.run_cycle().await;
        settle().await;

        assert!(matches!(first, CycleOutcome::Completed { new_entries: 1, .. }));
        assert!(matches!(second, CycleOutcome::Completed { new_entries: 0, .. }));
        assert_eq!(notifier.sent().len(), 1);
        assert!(store.is_known("42").await);
    }
}
