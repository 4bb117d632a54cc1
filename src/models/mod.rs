// src/models/mod.rs

//! Domain models for the store watcher.
//!
//! This module contains the data structures shared by the extractors, the
//! diff engine and the alert classifier.

mod alert;
mod config;
mod product;
mod snapshot;

// Re-export all public types
pub use alert::{Alert, AlertData, AlertKind, Severity};
pub use config::{
    Config, CrawlerConfig, ListingConfig, LoggingConfig, MAX_PLATFORM_PAGE_SIZE, PlatformConfig,
};
pub use product::{DEFAULT_CURRENCY, IdentityKey, Product, SourceTag, Variant};
pub use snapshot::Snapshot;
