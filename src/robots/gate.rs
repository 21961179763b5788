//! Robots.txt admission control
//!
//! [`RobotsGate`] answers "may this URL be fetched?" by consulting a cached,
//! per-origin policy. The first lookup for an origin fetches its robots.txt;
//! concurrent first lookups share that single fetch. A failed fetch caches
//! an allow-all policy, so an unreachable robots.txt is never retried within
//! the run.

use crate::robots::{ParsedRobots, RobotsError, RobotsSource};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Per-origin robots.txt policy cache in front of a [`RobotsSource`]
pub struct RobotsGate {
    source: Arc<dyn RobotsSource>,
    cache: DashMap<String, Arc<OnceCell<ParsedRobots>>>,
    timeout: Duration,
}

impl RobotsGate {
    /// Creates a gate with an empty cache
    ///
    /// # Arguments
    ///
    /// * `source` - Where robots.txt files come from
    /// * `timeout` - Upper bound on each robots.txt fetch
    pub fn new(source: Arc<dyn RobotsSource>, timeout: Duration) -> Self {
        Self {
            source,
            cache: DashMap::new(),
            timeout,
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// Fails open: if the origin's policy cannot be obtained the URL is allowed.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let origin = url.origin();
        if !origin.is_tuple() {
            tracing::debug!("{}", RobotsError::OpaqueOrigin(url.to_string()));
            return true;
        }

        let origin = origin.ascii_serialization();
        let cell = self.cell_for(&origin);
        let policy = cell.get_or_init(|| self.load_policy(&origin)).await;

        let allowed = policy.is_allowed(url.as_str());
        if !allowed {
            tracing::debug!("robots.txt disallows {}", url);
        }
        allowed
    }

    /// Number of origins with a cached (or in-flight) policy
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    // The shard lock is released before the caller awaits on the cell.
    fn cell_for(&self, origin: &str) -> Arc<OnceCell<ParsedRobots>> {
        self.cache
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone()
    }

    async fn load_policy(&self, origin: &str) -> ParsedRobots {
        let fetched = match tokio::time::timeout(self.timeout, self.source.fetch_robots_txt(origin))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RobotsError::Timeout {
                origin: origin.to_string(),
            }),
        };

        match fetched {
            Ok(robots_txt) => robots_txt.into_policy(),
            Err(e) => {
                tracing::warn!("{}; allowing all URLs on this origin", e);
                ParsedRobots::allow_all()
            }
        }
    }
}
