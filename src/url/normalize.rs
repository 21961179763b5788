use crate::UrlError;
use url::Url;

/// Parses a URL string into its canonical form
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Reject anything that is not `http` or `https`
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after #)
///
/// Scheme and host case, default ports, empty paths and dot segments are
/// normalized by the `url` parser itself. Query strings and trailing slashes
/// are preserved: two URLs differing only there are distinct pages.
///
/// # Arguments
///
/// * `url_str` - The URL string to canonicalize
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - Failed to parse or the URL is not crawlable
///
/// # Examples
///
/// ```
/// use crawl_ledger::url::canonicalize;
///
/// let url = canonicalize("HTTPS://Example.COM/a/../page#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already parsed URL
///
/// See [`canonicalize`] for the rules applied.
pub fn canonicalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        let result = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_lowercase_scheme_and_host() {
        let result = canonicalize("HTTPS://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = canonicalize("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = canonicalize("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_default_port_dropped() {
        let result = canonicalize("http://example.com:80/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_query_preserved() {
        let result = canonicalize("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let with = canonicalize("https://example.com/page/").unwrap();
        let without = canonicalize("https://example.com/page").unwrap();
        assert_ne!(with, without);
    }

    #[test]
    fn test_http_scheme_kept() {
        let result = canonicalize("http://example.com/page").unwrap();
        assert_eq!(result.scheme(), "http");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let result = canonicalize("  https://example.com/page \n").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = canonicalize("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_mailto_rejected() {
        let result = canonicalize("mailto:someone@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_url() {
        let result = canonicalize("not a url");
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(canonicalize("/relative/path").is_err());
    }
}
