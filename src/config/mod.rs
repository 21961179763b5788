//! Configuration module for Crawl-Ledger
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can also be configured from the command
//! line alone.
//!
//! # Example
//!
//! ```no_run
//! use crawl_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, StorageBackend, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_seed_list};
pub use validation::validate;
