//! Crawl-Ledger: a bounded, polite recursive web crawler
//!
//! This crate fetches pages from a set of seed URLs, follows links up to a
//! configurable depth, respects robots.txt, persists each page's visible text,
//! and reconciles what was discovered against what was actually crawled.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Crawl-Ledger operations
///
/// Only fatal startup conditions are reported here: building an engine from
/// a [`Config`] or starting a run. Per-URL failures are contained by the
/// engine and surface in the report.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("No seed URLs were provided")]
    NoSeeds,

    #[error("All {forbidden} seed URLs are disallowed by robots.txt")]
    NoAdmissibleSeeds { forbidden: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Crawl-Ledger operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, EngineSettings};
pub use output::CrawlReport;
pub use state::{FrontierStore, PageState};
pub use url::{canonicalize, storage_key};
