//! Storage keys for persisted pages
//!
//! A page is stored under the SHA-256 hex digest of its canonical URL.

use sha2::{Digest, Sha256};
use url::Url;

/// Derives the storage key for a canonical URL
///
/// The key is the hex-encoded SHA-256 digest of the full canonical URL, so
/// distinct URLs never share a record and repeated saves of the same URL
/// land on the same one. It is safe to use as a file name.
///
/// # Examples
///
/// ```
/// use crawl_ledger::url::{canonicalize, storage_key};
///
/// let url = canonicalize("https://example.com/page").unwrap();
/// assert_eq!(storage_key(&url).len(), 64);
/// ```
pub fn storage_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
