//! Local storage adapter
//!
//! The known-entry record and generated feed documents both live on local
//! disk and are replaced atomically on every write.

pub mod fs;
pub mod known_entries;

pub use fs::write_atomic;
pub use known_entries::JsonEntryStore;
