//! Output module for crawl progress and the reconciliation report
//!
//! This module handles:
//! - Counting discovered and processed pages as events arrive
//! - Rendering live progress
//! - Building the end-of-run report and writing it to a sink

mod progress;
mod report;
mod traits;

pub use progress::{
    log_progress, progress_channel, ProgressEvent, ProgressHandle, ProgressReceiver,
    ProgressSnapshot, ProgressTracker,
};
pub use report::{log_report, CrawlReport, FileReportSink};
pub use traits::{OutputError, OutputResult, ReportSink};
