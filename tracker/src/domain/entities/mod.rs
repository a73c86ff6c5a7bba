//! Domain entities
//!
//! Plain data shared by the poller, feed synthesizer and adapters.

pub mod content;
pub mod credential;
pub mod entry;
pub mod feed;
pub mod notification;
pub mod site;
pub mod topic;

pub use content::{ContentNode, SectionImage};
pub use credential::Credential;
pub use entry::{Entry, EntryDetail};
pub use feed::{sort_newest_first, FeedDocument, FeedItem, FeedMode};
pub use notification::Notification;
pub use topic::{lookup_topic, DateFormat, DisplayOptions, TopicStream};
