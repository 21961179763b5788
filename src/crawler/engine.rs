//! Crawl orchestration
//!
//! [`CrawlEngine`] seeds the frontier, runs one task per admitted URL
//! (fetch, extract, persist, expand links) with bounded concurrency, and
//! reconciles the frontier into a [`CrawlReport`] once no work remains or the
//! run is cancelled.

use crate::config::{parse_seed_list, validate, Config, CrawlerConfig};
use crate::crawler::extract::{HtmlTextExtractor, TextExtractor};
use crate::crawler::fetcher::{
    build_http_client, build_robots_client, FetchError, FetchResponse, Fetcher, HttpFetcher,
    MAX_REDIRECTS,
};
use crate::crawler::parser::parse_html;
use crate::output::{log_report, CrawlReport, FileReportSink, ProgressHandle, ReportSink};
use crate::robots::{HttpRobotsSource, RobotsGate};
use crate::state::{FrontierStore, PageState};
use crate::storage::{open_page_store, PageRecord, PageStore};
use crate::url::{canonicalize, canonicalize_url};
use crate::{CrawlError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Tunables for a crawl run
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Links are followed from pages shallower than this
    pub max_depth: u32,

    /// Upper bound on pages being fetched at once
    pub max_concurrent: usize,

    /// Upper bound on a single page fetch
    pub fetch_timeout: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_concurrent: config.max_concurrent_pages_open.max(1) as usize,
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// An admitted URL waiting to be processed
#[derive(Debug, Clone)]
struct WorkItem {
    url: Url,
    depth: u32,
}

/// Everything a crawl task needs, shared between tasks
struct CrawlContext {
    settings: EngineSettings,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn TextExtractor>,
    robots: Arc<RobotsGate>,
    store: Arc<dyn PageStore>,
    frontier: Arc<FrontierStore>,
    progress: ProgressHandle,
}

impl CrawlContext {
    /// Moves a URL into `processed` once it has reached an outcome
    fn complete(&self, url: &Url, outcome: PageState) {
        debug_assert!(PageState::Fetching.can_transition_to(outcome));
        debug_assert!(outcome.can_transition_to(PageState::Processed));
        if self.frontier.mark_processed(url) {
            self.progress.on_processed();
        }
        tracing::debug!("{} -> {} -> {}", url, outcome, PageState::Processed);
    }
}

/// Bounded, robots-aware recursive crawler
///
/// An engine owns one frontier; call [`CrawlEngine::run`] once per engine.
pub struct CrawlEngine {
    settings: EngineSettings,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn TextExtractor>,
    robots: Arc<RobotsGate>,
    store: Arc<dyn PageStore>,
    report_sink: Option<Arc<dyn ReportSink>>,
    frontier: Arc<FrontierStore>,
    progress: ProgressHandle,
}

impl CrawlEngine {
    /// Creates an engine with the HTML text extractor, no report sink and
    /// progress reporting disabled
    pub fn new(
        settings: EngineSettings,
        fetcher: Arc<dyn Fetcher>,
        robots: Arc<RobotsGate>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor: Arc::new(HtmlTextExtractor),
            robots,
            store,
            report_sink: None,
            frontier: Arc::new(FrontierStore::new()),
            progress: ProgressHandle::disabled(),
        }
    }

    /// Wires an engine to the real HTTP fetcher, robots.txt source, the
    /// configured page store and a file report sink
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to run
    /// * `Err(CrawlError::Config)` - The configuration failed validation
    /// * `Err(CrawlError::Http)` - An HTTP client could not be built
    /// * `Err(CrawlError::Storage)` - The page store could not be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;

        let page_client = build_http_client(&config.user_agent, config.crawler.fetch_timeout())?;
        let robots_client =
            build_robots_client(&config.user_agent, config.crawler.robots_timeout())?;
        let store = open_page_store(&config.output)?;

        let robots = Arc::new(RobotsGate::new(
            Arc::new(HttpRobotsSource::new(robots_client)),
            config.crawler.robots_timeout(),
        ));

        Ok(Self::new(
            EngineSettings::from_config(&config.crawler),
            Arc::new(HttpFetcher::new(page_client)),
            robots,
            store,
        )
        .with_report_sink(Arc::new(FileReportSink::new(Path::new(
            &config.output.report_dir,
        )))))
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Sends discovered/processed events to `progress`
    ///
    /// The receiving end only sees the channel close once the engine is
    /// dropped.
    pub fn with_progress(mut self, progress: ProgressHandle) -> Self {
        self.progress = progress;
        self
    }

    /// The frontier this engine admits into
    pub fn frontier(&self) -> &FrontierStore {
        &self.frontier
    }

    fn context(&self) -> Arc<CrawlContext> {
        Arc::new(CrawlContext {
            settings: self.settings.clone(),
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            robots: Arc::clone(&self.robots),
            store: Arc::clone(&self.store),
            frontier: Arc::clone(&self.frontier),
            progress: self.progress.clone(),
        })
    }

    /// Crawls from `seeds` until the frontier drains or `cancel` fires
    ///
    /// Each entry of `seeds` may itself be a comma-separated list; repeats
    /// are dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run finished or was cancelled; per-URL
    ///   failures are reflected in the report
    /// * `Err(CrawlError::NoSeeds)` - The seed list was empty
    /// * `Err(CrawlError::InvalidSeed)` - A seed is not an absolute http(s) URL
    /// * `Err(CrawlError::NoAdmissibleSeeds)` - robots.txt disallowed every
    ///   seed; the report is still written to the sink first
    pub async fn run(&self, seeds: &[String], cancel: CancellationToken) -> Result<CrawlReport> {
        let started_at = Utc::now();
        let seeds = validate_seeds(seeds)?;
        let ctx = self.context();

        tracing::info!(
            "Starting crawl of {} seed(s), max depth {}, {} concurrent",
            seeds.len(),
            self.settings.max_depth,
            self.settings.max_concurrent
        );

        let mut queue = VecDeque::new();
        for seed in seeds {
            if cancel.is_cancelled() {
                break;
            }

            if ctx.robots.is_allowed(&seed).await {
                if ctx.frontier.admit(&seed, 0) {
                    ctx.progress.on_discovered();
                    queue.push_back(WorkItem {
                        url: seed,
                        depth: 0,
                    });
                }
            } else {
                tracing::info!("Seed {} is disallowed by robots.txt", seed);
                ctx.frontier.mark_forbidden(&seed);
            }
        }

        if queue.is_empty() && !cancel.is_cancelled() {
            let report = self.finish(started_at, false);
            return Err(CrawlError::NoAdmissibleSeeds {
                forbidden: report.forbidden.len(),
            });
        }

        let mut tasks = JoinSet::new();
        let mut cancelled = cancel.is_cancelled();

        while !cancelled {
            while tasks.len() < self.settings.max_concurrent {
                let Some(item) = queue.pop_front() else {
                    break;
                };
                tasks.spawn(process_url(Arc::clone(&ctx), item));
            }

            if tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    cancelled = true;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(follow_ups)) => queue.extend(follow_ups),
                    Some(Err(e)) => tracing::error!("Crawl task failed: {}", e),
                    None => {}
                },
            }
        }

        if cancelled {
            tracing::warn!(
                "Crawl cancelled with {} task(s) in flight and {} queued",
                tasks.len(),
                queue.len()
            );
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }

        Ok(self.finish(started_at, cancelled))
    }

    /// Builds, logs and persists the report
    fn finish(&self, started_at: DateTime<Utc>, cancelled: bool) -> CrawlReport {
        let report = CrawlReport::from_snapshot(&self.frontier.snapshot(), started_at, cancelled);
        log_report(&report);

        if let Some(sink) = &self.report_sink {
            if let Err(e) = sink.write_report(&report) {
                tracing::error!("Failed to write crawl report: {}", e);
            }
        }

        report
    }
}

/// Splits, canonicalizes and de-duplicates the seed list
fn validate_seeds(seeds: &[String]) -> Result<Vec<Url>> {
    let raw = parse_seed_list(seeds);
    if raw.is_empty() {
        return Err(CrawlError::NoSeeds);
    }

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for seed in raw {
        let url = canonicalize(&seed).map_err(|e| CrawlError::InvalidSeed {
            url: seed.clone(),
            reason: e.to_string(),
        })?;
        if seen.insert(url.as_str().to_string()) {
            urls.push(url);
        }
    }

    Ok(urls)
}

/// Processes one admitted URL and returns the URLs it newly admitted
async fn process_url(ctx: Arc<CrawlContext>, item: WorkItem) -> Vec<WorkItem> {
    let WorkItem { url, depth } = item;
    debug_assert!(PageState::Admitted.can_transition_to(PageState::Fetching));
    tracing::debug!("{} -> {} (depth {})", url, PageState::Fetching, depth);

    let (outcome, links) = visit(&ctx, &url, depth).await;
    ctx.complete(&url, outcome);

    if !outcome.allows_expansion() {
        return Vec::new();
    }
    if depth >= ctx.settings.max_depth {
        tracing::trace!("Not expanding {}: depth {} reached", url, depth);
        return Vec::new();
    }

    expand_links(&ctx, links, depth + 1).await
}

/// Fetches and stores one page, returning its outcome and outbound links
async fn visit(ctx: &CrawlContext, url: &Url, depth: u32) -> (PageState, Vec<Url>) {
    let response = match fetch_with_timeout(ctx, url).await {
        Ok(Fetched::Page(response)) => response,
        Ok(Fetched::Disallowed(target)) => {
            tracing::info!("{} redirects to {}, which robots.txt disallows", url, target);
            ctx.frontier.mark_forbidden(&target);
            return (PageState::Forbidden, Vec::new());
        }
        Err(e) => {
            tracing::warn!("{}", e);
            return (PageState::FetchError, Vec::new());
        }
    };

    if response.is_forbidden() {
        tracing::info!("Link {} is forbidden", url);
        ctx.frontier.mark_forbidden(url);
        return (PageState::Forbidden, Vec::new());
    }

    if !response.is_success() {
        tracing::warn!("Fetching {} returned HTTP {}", url, response.status);
        return (PageState::FetchError, Vec::new());
    }

    let Some(body) = response.body.as_deref() else {
        tracing::warn!("Link {} is broken: empty response body", url);
        return (PageState::FetchError, Vec::new());
    };

    if !response.is_html() {
        tracing::info!(
            "Skipping non-HTML content at {} ({})",
            url,
            response.content_type.as_deref().unwrap_or_default()
        );
        return (PageState::FetchError, Vec::new());
    }

    let content = ctx.extractor.extract(body);
    let parsed = parse_html(&String::from_utf8_lossy(body), &response.final_url);

    let record = PageRecord {
        url: url.to_string(),
        final_url: response.final_url.to_string(),
        depth,
        fetched_at: Utc::now(),
        title: parsed.title,
        content,
    };
    if let Err(e) = ctx.store.save(&record) {
        tracing::warn!("Failed to save {}: {}", url, e);
    }

    (PageState::Saved, parsed.links)
}

/// Result of following a URL's redirect chain
enum Fetched {
    /// A non-redirect response
    Page(FetchResponse),
    /// The chain led to a URL robots.txt disallows; it was not requested
    Disallowed(Url),
}

async fn fetch_with_timeout(
    ctx: &CrawlContext,
    url: &Url,
) -> std::result::Result<Fetched, FetchError> {
    match tokio::time::timeout(ctx.settings.fetch_timeout, follow_redirects(ctx, url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
        }),
    }
}

/// Requests `url`, following redirects hop by hop
///
/// Each redirect target is checked against robots.txt before it is requested.
async fn follow_redirects(
    ctx: &CrawlContext,
    url: &Url,
) -> std::result::Result<Fetched, FetchError> {
    let mut current = url.clone();
    let mut visited = HashSet::from([current.to_string()]);

    for _ in 0..=MAX_REDIRECTS {
        let response = ctx.fetcher.fetch(&current).await?;
        let Some(target) = response.redirect_target() else {
            return Ok(Fetched::Page(response));
        };

        let target = canonicalize_url(target).map_err(|e| FetchError::Redirect {
            url: current.to_string(),
            message: e.to_string(),
        })?;
        if !visited.insert(target.to_string()) {
            return Err(FetchError::Redirect {
                url: current.to_string(),
                message: format!("redirect loop back to {}", target),
            });
        }
        if !ctx.robots.is_allowed(&target).await {
            return Ok(Fetched::Disallowed(target));
        }

        tracing::debug!("{} redirects to {}", current, target);
        current = target;
    }

    Err(FetchError::Redirect {
        url: url.to_string(),
        message: format!("more than {} redirects", MAX_REDIRECTS),
    })
}

/// Admits every allowed, unseen link at `next_depth`
async fn expand_links(ctx: &CrawlContext, links: Vec<Url>, next_depth: u32) -> Vec<WorkItem> {
    let mut admitted = Vec::new();

    for link in links {
        let url = match canonicalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Ignoring link: {}", e);
                continue;
            }
        };

        if ctx.frontier.is_counted(&url) || ctx.frontier.is_forbidden(&url) {
            continue;
        }

        if !ctx.robots.is_allowed(&url).await {
            ctx.frontier.mark_forbidden(&url);
            continue;
        }

        if ctx.frontier.admit(&url, next_depth) {
            ctx.progress.on_discovered();
            admitted.push(WorkItem {
                url,
                depth: next_depth,
            });
        }
    }

    admitted
}
