//! Storage module for persisting crawled pages
//!
//! This module handles durable page persistence, including:
//! - The [`PageStore`] interface the crawl engine writes through
//! - A JSON-document backend (one file per page)
//! - A SQLite backend (one row per page)
//!
//! Both backends key records by [`crate::url::storage_key`], so saving the
//! same URL twice overwrites the earlier record.

mod json_store;
mod schema;
mod sqlite;
mod traits;

pub use json_store::JsonFilePageStore;
pub use sqlite::SqlitePageStore;
pub use traits::{PageStore, StorageError, StorageResult};

use crate::config::{OutputConfig, StorageBackend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A crawled page as handed to a [`PageStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical URL that was requested
    pub url: String,

    /// URL the response was served from after redirects
    pub final_url: String,

    /// Link hops from a seed
    pub depth: u32,

    /// When the response was received
    pub fetched_at: DateTime<Utc>,

    /// Page title, if any
    pub title: Option<String>,

    /// Visible text of the page
    pub content: String,
}

/// Opens the page store selected by the output configuration
///
/// # Arguments
///
/// * `config` - The output configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn PageStore>)` - Ready-to-use store
/// * `Err(StorageError)` - Failed to create the directory or open the database
pub fn open_page_store(config: &OutputConfig) -> StorageResult<Arc<dyn PageStore>> {
    match config.backend {
        StorageBackend::Json => Ok(Arc::new(JsonFilePageStore::new(Path::new(
            &config.pages_dir,
        ))?)),
        StorageBackend::Sqlite => Ok(Arc::new(SqlitePageStore::new(Path::new(
            &config.database_path,
        ))?)),
    }
}
