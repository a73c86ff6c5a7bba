//! Discord adapter

pub mod webhook;

pub use webhook::DiscordNotifier;
