//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Only the wildcard (`User-agent: *`) rule group is consulted, and any failure to
//! obtain a policy is treated as "allow everything" for that origin.

mod gate;
mod parser;
mod source;

pub use gate::RobotsGate;
pub use parser::ParsedRobots;
pub use source::{HttpRobotsSource, RobotsSource, RobotsTxt};

use thiserror::Error;

/// Errors raised while obtaining a robots.txt policy
///
/// These never leave the [`RobotsGate`]: every variant resolves to an
/// allow-all policy.
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Timed out fetching robots.txt for {origin}")]
    Timeout { origin: String },

    #[error("URL has no origin: {0}")]
    OpaqueOrigin(String),
}
