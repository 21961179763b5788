//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// The user agent whose rule group is applied
pub const WILDCARD_AGENT: &str = "*";

/// Parsed robots.txt policy for one origin
///
/// This is a wrapper around the robotstxt crate's matcher, providing a simplified
/// interface for checking if URLs are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DisallowAll,
    Content(String),
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::allow_all();
        }

        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ParsedRobots that disallows everything
    ///
    /// This is used when the server refuses access to robots.txt itself.
    pub fn disallow_all() -> Self {
        Self {
            rules: Rules::DisallowAll,
        }
    }

    /// Returns true if this policy admits every URL
    pub fn is_allow_all(&self) -> bool {
        matches!(self.rules, Rules::AllowAll)
    }

    /// Checks if a URL is allowed by the wildcard rule group
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check (e.g., "https://example.com/page.html")
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, WILDCARD_AGENT, url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com";

    fn allowed(robots: &ParsedRobots, path: &str) -> bool {
        robots.is_allowed(&format!("{}{}", BASE, path))
    }

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(allowed(&robots, "/any/path"));
        assert!(allowed(&robots, "/admin"));
        assert!(robots.is_allow_all());
    }

    #[test]
    fn test_disallow_all_policy() {
        let robots = ParsedRobots::disallow_all();
        assert!(!allowed(&robots, "/"));
        assert!(!allowed(&robots, "/page"));
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!allowed(&robots, "/"));
        assert!(!allowed(&robots, "/page"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(allowed(&robots, "/"));
        assert!(allowed(&robots, "/page"));
        assert!(!allowed(&robots, "/admin"));
        assert!(!allowed(&robots, "/admin/users"));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = ParsedRobots::from_content(content);
        assert!(allowed(&robots, "/"));
        assert!(!allowed(&robots, "/private"));
        assert!(allowed(&robots, "/private/public"));
    }

    #[test]
    fn test_named_agent_groups_are_ignored() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(allowed(&robots, "/page"));
    }

    #[test]
    fn test_named_agent_group_without_wildcard_group() {
        let robots = ParsedRobots::from_content("User-agent: SomeBot\nDisallow: /");
        assert!(allowed(&robots, "/page"));
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(allowed(&robots, "/any/path"));
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("   \n");
        assert!(robots.is_allow_all());
        assert!(allowed(&robots, "/any/path"));
    }

    #[test]
    fn test_comments_ignored() {
        let content = "# keep out\nUser-agent: * # everyone\nDisallow: /tmp # scratch";
        let robots = ParsedRobots::from_content(content);
        assert!(!allowed(&robots, "/tmp/file"));
        assert!(allowed(&robots, "/index.html"));
    }
}
