//! URL handling module for Crawl-Ledger
//!
//! A crawled URL has two projections that must never be conflated:
//!
//! - the **canonical form** ([`canonicalize`]), an absolute http(s) URL that
//!   serves as the identity of a page for deduplication and reporting
//! - the **storage key** ([`storage_key`]), a fixed-width digest of the
//!   canonical form used to name persisted records

mod key;
mod normalize;

// Re-export main functions
pub use key::storage_key;
pub use normalize::{canonicalize, canonicalize_url};
