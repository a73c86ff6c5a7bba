//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod browser;
pub mod discord;
pub mod graph;
pub mod storage;

pub use browser::BrowserTokenSource;
pub use discord::DiscordNotifier;
pub use graph::GraphClient;
pub use storage::JsonEntryStore;
