//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Largest page size the platform feed accepts.
pub const MAX_PLATFORM_PAGE_SIZE: usize = 250;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Platform JSON feed pagination
    #[serde(default)]
    pub platform: PlatformConfig,

    /// HTML fallback probing
    #[serde(default)]
    pub listing: ListingConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.platform.page_size == 0 || self.platform.page_size > MAX_PLATFORM_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "platform.page_size must be within 1..={MAX_PLATFORM_PAGE_SIZE}"
            )));
        }
        if self.platform.max_pages == 0 {
            return Err(AppError::validation("platform.max_pages must be > 0"));
        }
        if self.listing.paths.is_empty() {
            return Err(AppError::validation("No listing paths defined"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum number of stores crawled at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Platform product feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Products requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Upper bound on pages requested per crawl
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            max_pages: defaults::max_pages(),
        }
    }
}

/// HTML fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Candidate listing paths, probed in order
    #[serde(default = "defaults::listing_paths")]
    pub paths: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            paths: defaults::listing_paths(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        4
    }

    pub fn page_size() -> usize {
        super::MAX_PLATFORM_PAGE_SIZE
    }
    pub fn max_pages() -> usize {
        10
    }

    pub fn listing_paths() -> Vec<String> {
        vec![
            "/collections/all".into(),
            "/products".into(),
            "/shop".into(),
            "/".into(),
        ]
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
