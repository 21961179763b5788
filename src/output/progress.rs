//! Crawl progress accounting
//!
//! Crawl tasks never touch the counters directly. They send
//! [`ProgressEvent`]s through a [`ProgressHandle`]; a single receiver task
//! applies them to a [`ProgressTracker`] and hands each new snapshot to a
//! renderer.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// A discrete progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A URL was admitted to the frontier
    Discovered,
    /// An admitted URL reached its terminal state
    Processed,
}

/// Point-in-time view of crawl progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed_count: u64,
    pub total_count: u64,
    pub percent: f64,
}

impl ProgressSnapshot {
    fn new(processed_count: u64, total_count: u64) -> Self {
        let percent = if total_count > 0 {
            processed_count as f64 / total_count as f64 * 100.0
        } else {
            0.0
        };
        Self {
            processed_count,
            total_count,
            percent,
        }
    }
}

/// Discovered/processed counters
///
/// The total keeps growing while pages are processed, so `percent` can go
/// down between two snapshots.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    processed: AtomicU64,
    total: AtomicU64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_discovered(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Applies one event
    pub fn apply(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Discovered => self.on_discovered(),
            ProgressEvent::Processed => self.on_processed(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

/// Sending half of the progress channel
///
/// Cheap to clone; a closed receiver is ignored so progress can never stall
/// a crawl.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressHandle {
    /// A handle that drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn on_discovered(&self) {
        self.send(ProgressEvent::Discovered);
    }

    pub fn on_processed(&self) {
        self.send(ProgressEvent::Processed);
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Receiving half of the progress channel
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
    tracker: ProgressTracker,
}

impl ProgressReceiver {
    /// Applies events until every [`ProgressHandle`] is dropped
    ///
    /// `render` is called with the snapshot after each processed page.
    /// Discoveries only update the counts. Returns the final snapshot.
    pub async fn run<F>(mut self, mut render: F) -> ProgressSnapshot
    where
        F: FnMut(&ProgressSnapshot),
    {
        while let Some(event) = self.rx.recv().await {
            self.tracker.apply(event);
            if matches!(event, ProgressEvent::Processed) {
                render(&self.tracker.snapshot());
            }
        }
        self.tracker.snapshot()
    }
}

/// Creates a connected handle/receiver pair
pub fn progress_channel() -> (ProgressHandle, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressHandle { tx: Some(tx) },
        ProgressReceiver {
            rx,
            tracker: ProgressTracker::new(),
        },
    )
}

/// Default renderer: one log line per processed page
pub fn log_progress(snapshot: &ProgressSnapshot) {
    tracing::info!(
        "Progress: {}/{} pages crawled ({:.2}% complete)",
        snapshot.processed_count,
        snapshot.total_count,
        snapshot.percent
    );
}
