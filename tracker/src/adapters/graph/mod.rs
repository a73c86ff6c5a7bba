//! Content API adapter
//!
//! Implementation of the newswire persisted-query API client.

pub mod client;

pub use client::GraphClient;
