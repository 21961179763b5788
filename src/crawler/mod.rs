//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Visible-text extraction and HTML link parsing
//! - The [`CrawlEngine`] that drives the whole run

mod engine;
mod extract;
mod fetcher;
mod parser;

pub use engine::{CrawlEngine, EngineSettings};
pub use extract::{HtmlTextExtractor, TextExtractor};
pub use fetcher::{
    build_http_client, build_robots_client, FetchError, FetchResponse, Fetcher, HttpFetcher,
    MAX_REDIRECTS,
};
pub use parser::{parse_html, ParsedPage};
