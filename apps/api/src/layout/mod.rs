// Text layout: font metrics, greedy word wrap, and the paginating cursor.
// All of it is synchronous; callers on the async side run it inside
// tokio::task::spawn_blocking.

pub mod engine;
pub mod font_metrics;
pub mod wrap;

pub use font_metrics::PageConfig;
