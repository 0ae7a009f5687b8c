//! Crawl lifecycle phases
//!
//! A run moves strictly forward: `Init → Crawling → Complete → Exported`,
//! or `Crawling → Cancelled` when the operator aborts. No transition is
//! reversible.

use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Seed enqueued, nothing fetched yet
    Init,

    /// Worker pool running while pending work exists
    Crawling,

    /// Frontier exhausted or the expected product count reached
    Complete,

    /// Records written to the export file
    Exported,

    /// Aborted by the operator; nothing is exported
    Cancelled,
}

impl CrawlPhase {
    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Crawling)
                | (Self::Crawling, Self::Complete)
                | (Self::Crawling, Self::Cancelled)
                | (Self::Complete, Self::Exported)
        )
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exported | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Crawling => "crawling",
            Self::Complete => "complete",
            Self::Exported => "exported",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
