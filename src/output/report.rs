//! End-of-run reconciliation report
//!
//! The report compares what the frontier admitted with what was actually
//! processed. Anything admitted but never processed is listed as uncrawled.

use crate::output::traits::{OutputResult, ReportSink};
use crate::state::FrontierSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the uncrawled URL list inside the report directory
pub const UNCRAWLED_FILE: &str = "uncrawled_urls.txt";

/// Name of the forbidden URL list inside the report directory
pub const FORBIDDEN_FILE: &str = "forbidden_urls.txt";

/// Name of the JSON summary inside the report directory
pub const SUMMARY_FILE: &str = "crawl_report.json";

/// Immutable summary of one crawl run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlReport {
    pub total_counted: usize,
    pub total_processed: usize,
    pub uncrawled: BTreeSet<String>,
    pub forbidden: BTreeSet<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// True when the run was stopped before the frontier drained
    pub cancelled: bool,
}

impl CrawlReport {
    /// Builds the report from the final frontier state
    pub fn from_snapshot(
        snapshot: &FrontierSnapshot,
        started_at: DateTime<Utc>,
        cancelled: bool,
    ) -> Self {
        Self {
            total_counted: snapshot.counted.len(),
            total_processed: snapshot.processed.len(),
            uncrawled: snapshot.remaining(),
            forbidden: snapshot.forbidden.clone(),
            started_at,
            finished_at: Utc::now(),
            cancelled,
        }
    }

    /// `total_counted - total_processed`
    pub fn difference(&self) -> usize {
        self.total_counted.saturating_sub(self.total_processed)
    }

    /// Returns true if every admitted URL was processed
    pub fn is_complete(&self) -> bool {
        self.uncrawled.is_empty()
    }
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    total_counted: usize,
    total_processed: usize,
    difference: usize,
    uncrawled_count: usize,
    forbidden_count: usize,
    started_at: &'a DateTime<Utc>,
    finished_at: &'a DateTime<Utc>,
    cancelled: bool,
}

/// Writes the report as two URL lists plus a JSON summary
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_url_list(path: &Path, urls: &BTreeSet<String>) -> OutputResult<()> {
    let mut body = String::new();
    for url in urls {
        body.push_str(url);
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

impl ReportSink for FileReportSink {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        fs::create_dir_all(&self.dir)?;

        write_url_list(&self.dir.join(UNCRAWLED_FILE), &report.uncrawled)?;
        write_url_list(&self.dir.join(FORBIDDEN_FILE), &report.forbidden)?;

        let summary = ReportSummary {
            total_counted: report.total_counted,
            total_processed: report.total_processed,
            difference: report.difference(),
            uncrawled_count: report.uncrawled.len(),
            forbidden_count: report.forbidden.len(),
            started_at: &report.started_at,
            finished_at: &report.finished_at,
            cancelled: report.cancelled,
        };
        fs::write(
            self.dir.join(SUMMARY_FILE),
            serde_json::to_string_pretty(&summary)?,
        )?;

        tracing::debug!("Wrote crawl report to {}", self.dir.display());
        Ok(())
    }
}

/// Logs the termination summary
pub fn log_report(report: &CrawlReport) {
    if report.uncrawled.is_empty() {
        tracing::info!("Uncrawled URLs: none");
    } else {
        tracing::warn!("Uncrawled URLs ({}):", report.uncrawled.len());
        for url in &report.uncrawled {
            tracing::warn!("  {}", url);
        }
    }

    if report.forbidden.is_empty() {
        tracing::info!("Forbidden URLs: none");
    } else {
        tracing::info!("Forbidden URLs ({}):", report.forbidden.len());
        for url in &report.forbidden {
            tracing::info!("  {}", url);
        }
    }

    tracing::info!("Total URLs counted: {}", report.total_counted);
    tracing::info!("Total URLs processed: {}", report.total_processed);
    tracing::info!("Difference: {}", report.difference());

    if report.cancelled {
        tracing::warn!("Crawl was cancelled before the frontier drained");
    }
}
