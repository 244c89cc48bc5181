/// Run phase definitions for the scrape state machine
///
/// The coordinator moves through these phases in a fixed order: pagination
/// first, then one fetch/parse/write cycle per discovered detail page.
use std::fmt;

/// Represents the current phase of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Not started yet
    Idle,

    /// Fetching and parsing the given listing page (1-based)
    Listing { page: u32 },

    /// Pagination is exhausted; the pending detail targets are final
    CollectingDetails,

    /// Fetching a detail page
    Fetching,

    /// Parsing a fetched detail page
    Parsing,

    /// Writing a parsed record to the output directory
    Writing,

    /// Every detail target has been attempted once
    Done,
}

impl RunPhase {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Allowed transitions:
    /// - `Idle` → `Listing(1)`
    /// - `Listing(n)` → `Listing(n+1)` | `CollectingDetails`
    /// - `CollectingDetails` → `Fetching` | `Done`
    /// - `Fetching` → `Parsing` | `Fetching` (previous fetch failed) | `Done`
    /// - `Parsing` → `Writing` | `Fetching` (previous parse failed) | `Done`
    /// - `Writing` → `Fetching` | `Done`
    /// - `Done` → nothing
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Listing { page }) => page == 1,
            (Self::Listing { page }, Self::Listing { page: next_page }) => next_page == page + 1,
            (Self::Listing { .. }, Self::CollectingDetails) => true,
            (Self::CollectingDetails, Self::Fetching | Self::Done) => true,
            (Self::Fetching, Self::Parsing | Self::Fetching | Self::Done) => true,
            (Self::Parsing, Self::Writing | Self::Fetching | Self::Done) => true,
            (Self::Writing, Self::Fetching | Self::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listing { page } => write!(f, "listing(page {})", page),
            Self::CollectingDetails => write!(f, "collecting_details"),
            Self::Fetching => write!(f, "fetching"),
            Self::Parsing => write!(f, "parsing"),
            Self::Writing => write!(f, "writing"),
            Self::Done => write!(f, "done"),
        }
    }
}
