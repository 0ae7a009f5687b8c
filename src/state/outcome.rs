use crate::crawler::FetchErrorKind;
use crate::output::RecordField;

/// What happened to one crawl task
///
/// Every dispatched task ends in exactly one of these; none of them stops
/// the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Fetched a non-product page and enqueued its links
    Listing { links_enqueued: usize },

    /// Fetched a product page and extracted a record
    ///
    /// `accepted` is false when the record fell outside the expected number
    /// of earliest-discovered records.
    Product {
        links_enqueued: usize,
        accepted: bool,
    },

    /// Fetched a product page that lacked required fields
    Incomplete {
        links_enqueued: usize,
        missing: Vec<RecordField>,
    },

    /// Redirected onto a page another task owns; nothing was processed
    Duplicate,

    /// The fetch failed after all retries; the task is abandoned
    FetchFailed { kind: FetchErrorKind },
}

impl TaskOutcome {
    pub fn is_fetched(&self) -> bool {
        !matches!(self, Self::FetchFailed { .. })
    }
}
