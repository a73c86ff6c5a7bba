//! Feed module
//!
//! Article body rendering and RSS serialisation.

pub mod renderer;
pub mod syndication;

pub use renderer::render_body;
pub use syndication::to_rss;
