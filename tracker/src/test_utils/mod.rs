//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Mocks are hand-written rather than generated: port methods take `&str`
//! and `&Credential` parameters, and explicit mocks let each test script
//! exactly what the network returns and inspect what was asked of it.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
