//! Output sink traits and error types
//!
//! This module defines the trait interface for report sinks and the errors
//! they can raise.

use crate::output::CrawlReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Durable destination for the final crawl report
pub trait ReportSink: Send + Sync {
    /// Writes the report
    ///
    /// # Arguments
    ///
    /// * `report` - The completed crawl report
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()>;
}
