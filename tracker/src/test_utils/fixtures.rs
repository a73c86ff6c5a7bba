//! Test fixtures
//!
//! Factory functions for creating test data.

use chrono::{DateTime, Utc};

use crate::app::feed_service::stream_document;
use crate::domain::entities::{
    lookup_topic, ContentNode, DisplayOptions, Entry, EntryDetail, FeedDocument, FeedItem,
    Notification, TopicStream,
};
use std::time::Duration;

/// Create a test entry with a site-relative URL and a fixed date
pub fn test_entry(id: &str, title: &str) -> Entry {
    Entry {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("/newswire/article/{}", id),
        created: "2024-03-05 10:00:00".to_string(),
        tags: vec!["Rockstar".to_string()],
        preview_image: Some(format!("https://cdn.example/{}.jpg", id)),
    }
}

/// Create a detail payload whose content is a single raw HTML block
pub fn test_detail(title: &str, markup: &str) -> EntryDetail {
    EntryDetail {
        title: title.to_string(),
        subtitle: None,
        content: Some(ContentNode::RawHtml {
            markup: markup.to_string(),
        }),
    }
}

/// Create a stream for a catalogue topic, with a webhook configured
pub fn test_stream(name: &str) -> TopicStream {
    TopicStream {
        name: name.to_string(),
        topic_id: lookup_topic(name).flatten(),
        refresh_interval: Duration::from_secs(60),
        webhook_url: Some("https://discord.example/api/webhooks/1/test".to_string()),
        display: DisplayOptions::default(),
    }
}

pub fn test_notification(id: &str) -> Notification {
    Notification {
        entry_id: id.to_string(),
        topic: "latest".to_string(),
        title: format!("Entry {}", id),
        link: format!("https://www.rockstargames.com/newswire/article/{}", id),
        image: None,
        date: "05/03/2024".to_string(),
        tags: vec!["Rockstar".to_string()],
        subtitle: Some("Subtitle".to_string()),
    }
}

pub fn test_feed_item(id: &str, published: Option<DateTime<Utc>>) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        title: format!("Entry {}", id),
        link: format!("https://www.rockstargames.com/newswire/article/{}", id),
        description: format!("Entry {}", id),
        content: format!("Entry {}", id),
        author: "Rockstar Games".to_string(),
        published,
        image: None,
    }
}

pub fn test_feed_document(topic: &str, items: Vec<FeedItem>) -> FeedDocument {
    stream_document(topic, items)
}
