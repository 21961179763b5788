use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for Crawl-Ledger
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URLs the crawl starts from
    pub seeds: Vec<String>,

    /// Maximum number of link hops followed from a seed
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches
    pub max_concurrent_pages_open: u32,

    /// Timeout for a single page fetch (seconds)
    pub fetch_timeout_secs: u64,

    /// Timeout for a single robots.txt fetch (seconds)
    pub robots_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            max_depth: 2,
            max_concurrent_pages_open: 16,
            fetch_timeout_secs: 30,
            robots_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Where crawled pages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document per page in `pages-dir`
    #[default]
    Json,
    /// A single SQLite database at `database-path`
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Page storage backend
    pub backend: StorageBackend,

    /// Directory for JSON page documents
    pub pages_dir: String,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Directory receiving the uncrawled/forbidden lists and the JSON report
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            pages_dir: "files_crawled".to_string(),
            database_path: "pages.db".to_string(),
            report_dir: ".".to_string(),
        }
    }
}
