//! Page state definitions for tracking crawl progress
//!
//! This module defines all possible states a URL can be in during a crawl run.

use std::fmt;

/// Represents the current state of a URL in the crawl process
///
/// ```text
/// Discovered -> Admitted -> Fetching -> { Saved | Forbidden | FetchError } -> Processed
/// ```
///
/// A URL rejected by robots.txt goes from `Discovered` straight to `Forbidden`
/// and is never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL has been seen in a seed list or on a page
    Discovered,

    /// URL passed robots.txt and deduplication and is waiting to be fetched
    Admitted,

    /// URL is currently being fetched
    Fetching,

    // ===== Fetch Outcomes =====
    /// Page was fetched and its content handed to the page store
    Saved,

    /// Robots.txt disallows the URL, or the server answered HTTP 403
    Forbidden,

    /// Transport failure, timeout, missing body or non-success status
    FetchError,

    // ===== Terminal State =====
    /// The fetch attempt is complete
    Processed,
}

impl PageState {
    /// Returns true if links may be followed out of a URL in this state
    pub fn allows_expansion(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Checks whether the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Admitted)
                | (Self::Discovered, Self::Forbidden)
                | (Self::Admitted, Self::Fetching)
                | (Self::Fetching, Self::Saved)
                | (Self::Fetching, Self::Forbidden)
                | (Self::Fetching, Self::FetchError)
                | (Self::Saved, Self::Processed)
                | (Self::Forbidden, Self::Processed)
                | (Self::FetchError, Self::Processed)
        )
    }

    /// Returns the lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Admitted => "admitted",
            Self::Fetching => "fetching",
            Self::Saved => "saved",
            Self::Forbidden => "forbidden",
            Self::FetchError => "fetch_error",
            Self::Processed => "processed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_saved_pages_expand() {
        assert!(PageState::Saved.allows_expansion());
        assert!(!PageState::Forbidden.allows_expansion());
        assert!(!PageState::FetchError.allows_expansion());
    }

    #[test]
    fn test_fetch_path_transitions() {
        use PageState::*;
        assert!(Discovered.can_transition_to(Admitted));
        assert!(Admitted.can_transition_to(Fetching));
        assert!(Fetching.can_transition_to(Saved));
        assert!(Fetching.can_transition_to(Forbidden));
        assert!(Fetching.can_transition_to(FetchError));
        for outcome in [Saved, Forbidden, FetchError] {
            assert!(outcome.can_transition_to(Processed));
        }
        assert!(!Fetching.can_transition_to(Processed));
        assert!(!Admitted.can_transition_to(Saved));
    }

    #[test]
    fn test_robots_rejection_skips_fetch() {
        assert!(PageState::Discovered.can_transition_to(PageState::Forbidden));
        assert!(!PageState::Discovered.can_transition_to(PageState::Fetching));
    }

    #[test]
    fn test_processed_is_final() {
        use PageState::*;
        for next in [Discovered, Admitted, Fetching, Saved, Forbidden, FetchError, Processed] {
            assert!(!Processed.can_transition_to(next));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Discovered), "discovered");
        assert_eq!(format!("{}", PageState::FetchError), "fetch_error");
        assert_eq!(format!("{}", PageState::Processed), "processed");
    }
}
