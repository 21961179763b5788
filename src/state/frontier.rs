//! Frontier bookkeeping for a crawl run
//!
//! The frontier tracks three sets of canonical URLs:
//!
//! - **counted**: every URL ever admitted to the work queue
//! - **processed**: every admitted URL whose fetch attempt has completed
//! - **forbidden**: URLs rejected by robots.txt or answered with HTTP 403
//!
//! All three live behind a single lock, so every operation observes and
//! mutates them atomically. This is what keeps `processed ⊆ counted` true at
//! every observation point and makes [`FrontierStore::admit`] a single
//! check-and-set under concurrent discovery.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use url::Url;

/// The first admission of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionRecord {
    /// Canonical URL
    pub url: String,

    /// Link hops from a seed at first admission
    pub depth: u32,

    /// When the URL was admitted
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct FrontierSets {
    counted: HashMap<String, AdmissionRecord>,
    processed: HashSet<String>,
    forbidden: HashSet<String>,
}

/// A consistent copy of the frontier sets taken under one lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    pub counted: BTreeSet<String>,
    pub processed: BTreeSet<String>,
    pub forbidden: BTreeSet<String>,
}

impl FrontierSnapshot {
    /// URLs admitted but never processed (`counted \ processed`)
    pub fn remaining(&self) -> BTreeSet<String> {
        self.counted.difference(&self.processed).cloned().collect()
    }
}

/// Shared frontier state for one crawl run
///
/// URLs are keyed by their canonical form (see [`crate::url::canonicalize`]).
/// All mutation goes through the methods below; membership in every set is
/// monotonic for the lifetime of the store.
#[derive(Debug, Default)]
pub struct FrontierStore {
    sets: Mutex<FrontierSets>,
}

impl FrontierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a URL into the work queue
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not counted before and now is, at `depth`
    /// * `false` - The URL was already counted; its original depth is kept
    pub fn admit(&self, url: &Url, depth: u32) -> bool {
        let mut sets = self.sets.lock();
        if sets.counted.contains_key(url.as_str()) {
            return false;
        }

        sets.counted.insert(
            url.as_str().to_string(),
            AdmissionRecord {
                url: url.as_str().to_string(),
                depth,
                discovered_at: Utc::now(),
            },
        );
        true
    }

    /// Records that the fetch attempt for `url` has completed
    ///
    /// Idempotent. A URL that was never admitted is not recorded, since
    /// `processed` may only ever contain counted URLs.
    ///
    /// # Returns
    ///
    /// `true` if this call moved the URL into `processed`
    pub fn mark_processed(&self, url: &Url) -> bool {
        let mut sets = self.sets.lock();
        if !sets.counted.contains_key(url.as_str()) {
            tracing::warn!("Refusing to mark unadmitted URL {} as processed", url);
            return false;
        }
        sets.processed.insert(url.as_str().to_string())
    }

    /// Records that `url` is forbidden
    ///
    /// # Returns
    ///
    /// `true` if the URL was not already forbidden
    pub fn mark_forbidden(&self, url: &Url) -> bool {
        self.sets.lock().forbidden.insert(url.as_str().to_string())
    }

    pub fn is_counted(&self, url: &Url) -> bool {
        self.sets.lock().counted.contains_key(url.as_str())
    }

    pub fn is_processed(&self, url: &Url) -> bool {
        self.sets.lock().processed.contains(url.as_str())
    }

    pub fn is_forbidden(&self, url: &Url) -> bool {
        self.sets.lock().forbidden.contains(url.as_str())
    }

    /// Depth recorded at the URL's first admission
    pub fn depth_of(&self, url: &Url) -> Option<u32> {
        self.sets.lock().counted.get(url.as_str()).map(|r| r.depth)
    }

    /// Full admission record for a URL
    pub fn admission(&self, url: &Url) -> Option<AdmissionRecord> {
        self.sets.lock().counted.get(url.as_str()).cloned()
    }

    /// URLs admitted but not yet processed (`counted \ processed`)
    pub fn remaining(&self) -> BTreeSet<String> {
        let sets = self.sets.lock();
        sets.counted
            .keys()
            .filter(|url| !sets.processed.contains(*url))
            .cloned()
            .collect()
    }

    pub fn counted_len(&self) -> usize {
        self.sets.lock().counted.len()
    }

    pub fn processed_len(&self) -> usize {
        self.sets.lock().processed.len()
    }

    pub fn forbidden_len(&self) -> usize {
        self.sets.lock().forbidden.len()
    }

    /// Copies all three sets atomically
    pub fn snapshot(&self) -> FrontierSnapshot {
        let sets = self.sets.lock();
        FrontierSnapshot {
            counted: sets.counted.keys().cloned().collect(),
            processed: sets.processed.iter().cloned().collect(),
            forbidden: sets.forbidden.iter().cloned().collect(),
        }
    }
}
