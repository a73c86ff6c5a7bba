//! Domain ports (traits)
//!
//! Port traits define interfaces that the application layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod newswire;
pub mod notifier;
pub mod store;
pub mod token;

pub use newswire::NewswireApi;
pub use notifier::Notifier;
pub use store::EntryStore;
pub use token::TokenSource;
