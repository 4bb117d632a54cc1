//! Change detection over crawled snapshots.
//!
//! - `diff`: Compare two snapshots of a store
//! - `classify`: Rank catalog changes into alerts
//! - `watch`: Crawl, diff and classify one competitor

pub mod classify;
pub mod diff;
pub mod watch;

pub use classify::{classify, classify_at};
pub use diff::{CatalogDiff, DiffResult, PriceChange, calculate_diff, diff};
pub use watch::{ScanStatus, WatchOutcome, watch_store};
