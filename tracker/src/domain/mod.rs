//! Domain layer
//!
//! Contains pure newswire models with no I/O.
//! - `entities`: topics, entries, content trees, feed documents
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod ports;
