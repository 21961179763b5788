//! Storage traits and error types
//!
//! This module defines the trait interface for page storage backends and
//! associated error types.

use crate::storage::PageRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL in record: {0}")]
    InvalidUrl(String),

    #[error("Corrupt record for {key}: {message}")]
    Corrupt { key: String, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page storage backends
///
/// Implementations must be safe to share between concurrent crawl tasks.
/// Writes are keyed by the record's URL: saving a URL that is already stored
/// replaces the earlier record rather than adding a second one.
pub trait PageStore: Send + Sync {
    /// Persists a page, overwriting any earlier record for the same URL
    fn save(&self, record: &PageRecord) -> StorageResult<()>;

    /// Loads the record stored for a canonical URL
    fn load(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Counts stored pages
    fn count(&self) -> StorageResult<usize>;
}
