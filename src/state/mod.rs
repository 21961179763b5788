//! State module for tracking crawl progress
//!
//! This module provides the per-URL state machine and the frontier bookkeeping
//! shared by every unit of work in a crawl run.
//!
//! # Components
//!
//! - `PageState`: The lifecycle of a single URL (discovered, admitted, fetching, ...)
//! - `FrontierStore`: The counted/processed/forbidden sets with atomic mutation

mod frontier;
mod page_state;

// Re-export main types
pub use frontier::{AdmissionRecord, FrontierSnapshot, FrontierStore};
pub use page_state::PageState;
