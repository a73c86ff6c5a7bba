//! Headless browser adapter
//!
//! Observes the public newswire page to learn the current list-query hash.

pub mod token_source;

pub use token_source::BrowserTokenSource;
