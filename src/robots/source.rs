//! Robots.txt retrieval
//!
//! The gate consumes robots.txt through the [`RobotsSource`] trait so the
//! transport can be swapped out. [`HttpRobotsSource`] is the production
//! implementation on top of reqwest.

use crate::robots::{ParsedRobots, RobotsError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Outcome of asking an origin for its robots.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsTxt {
    /// The file was served; its raw content
    Body(String),
    /// The server answered, but has no robots.txt (404 and friends)
    Missing,
    /// The server refused access to robots.txt (401/403)
    AccessDenied,
}

impl RobotsTxt {
    /// Converts the fetch outcome into a policy
    ///
    /// | Outcome | Policy |
    /// |---------|--------|
    /// | Body | parsed rules |
    /// | Missing | allow all |
    /// | AccessDenied | disallow all |
    pub fn into_policy(self) -> ParsedRobots {
        match self {
            Self::Body(content) => ParsedRobots::from_content(&content),
            Self::Missing => ParsedRobots::allow_all(),
            Self::AccessDenied => ParsedRobots::disallow_all(),
        }
    }
}

/// Source of robots.txt files
#[async_trait]
pub trait RobotsSource: Send + Sync {
    /// Fetches robots.txt for an origin such as `https://example.com`
    async fn fetch_robots_txt(&self, origin: &str) -> Result<RobotsTxt, RobotsError>;
}

/// Fetches robots.txt over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpRobotsSource {
    client: Client,
}

impl HttpRobotsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RobotsSource for HttpRobotsSource {
    async fn fetch_robots_txt(&self, origin: &str) -> Result<RobotsTxt, RobotsError> {
        let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));
        tracing::debug!("Fetching {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .send()
            .await
            .map_err(|e| RobotsError::Fetch {
                url: robots_url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(RobotsTxt::AccessDenied);
        }

        if !status.is_success() {
            tracing::debug!("{} answered HTTP {}, treating as absent", robots_url, status);
            return Ok(RobotsTxt::Missing);
        }

        let body = response.text().await.map_err(|e| RobotsError::Fetch {
            url: robots_url,
            message: e.to_string(),
        })?;

        Ok(RobotsTxt::Body(body))
    }
}
