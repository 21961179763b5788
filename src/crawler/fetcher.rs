//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Single GET requests; redirects are returned to the caller, not followed
//! - Error classification (timeout vs. transport failure)
//!
//! The engine only sees the [`Fetcher`] trait, so tests can drive it with
//! canned responses. Every redirect hop is followed by the engine, which
//! checks robots.txt for the target before requesting it.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, CONTENT_TYPE, LOCATION},
    redirect::Policy,
    Client,
};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirect hops followed for a single page
pub const MAX_REDIRECTS: usize = 10;

/// A response as seen by the crawl engine
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body, `None` if the server sent nothing
    pub body: Option<Vec<u8>>,

    /// URL the response was served from
    pub final_url: Url,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Location header value
    pub location: Option<String>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }

    /// Absolute target of a 3xx response, resolved against `final_url`
    ///
    /// `None` for non-redirect statuses and for redirects without a usable
    /// Location header.
    pub fn redirect_target(&self) -> Option<Url> {
        if !(300..400).contains(&self.status) {
            return None;
        }
        let location = self.location.as_deref()?.trim();
        if location.is_empty() {
            return None;
        }
        self.final_url.join(location).ok()
    }

    /// Returns true unless the Content-Type names something other than HTML/text
    ///
    /// A missing header is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(value) => {
                let mime = value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase();
                mime.is_empty()
                    || mime.starts_with("text/")
                    || mime == "application/xhtml+xml"
            }
        }
    }
}

/// Errors a fetch can end in
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Redirect from {url} failed: {message}")]
    Redirect { url: String, message: String },
}

/// Page transport used by the crawl engine
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Builds the HTTP client used for page requests
///
/// The client does not follow redirects; see [`FetchResponse::redirect_target`].
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound on a whole request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use crawl_ledger::config::UserAgentConfig;
/// use crawl_ledger::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    client_builder(config, timeout)
        .redirect(Policy::none()) // Handle redirects manually
        .build()
}

/// Builds the HTTP client used for robots.txt requests
///
/// Unlike [`build_http_client`], this one follows redirects itself, since
/// robots.txt is not subject to robots.txt.
pub fn build_robots_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    client_builder(config, timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
}

fn client_builder(config: &UserAgentConfig, timeout: Duration) -> reqwest::ClientBuilder {
    // Format: CrawlerName/Version (+ContactURL)
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn classify(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = header_value(response.headers(), CONTENT_TYPE);
        let location = header_value(response.headers(), LOCATION);

        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(bytes.to_vec())
        };

        Ok(FetchResponse {
            status,
            body,
            final_url,
            content_type,
            location,
        })
    }
}
