//! Application layer
//!
//! Services coordinate between domain entities, ports, and external systems.

pub mod credentials;
pub mod feed_service;
pub mod poller;

pub use credentials::CredentialProvider;
pub use feed_service::{FeedLocator, FeedService};
pub use poller::PollerService;
