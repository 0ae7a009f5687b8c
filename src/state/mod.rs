//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of a whole run (init, crawling, complete, exported)
//! - `Frontier`: visited set and pending queue of `CrawlTask`s
//! - `TaskOutcome`: how a single dispatched task ended
//! - `CrawlState`: the frontier and the record aggregator, shared by every worker

mod frontier;
mod outcome;
mod phase;

// Re-export main types
pub use frontier::{CrawlTask, Frontier};
pub use outcome::TaskOutcome;
pub use phase::CrawlPhase;

use crate::output::Aggregator;
use url::Url;

/// All mutable state of one crawl run
///
/// Shared between workers behind an `Arc`; each part guards itself.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub frontier: Frontier,
    pub aggregator: Aggregator,
}

impl CrawlState {
    /// Creates the state for a run seeded with `seed`
    pub fn seeded(seed: Url, expected_products: Option<usize>) -> Self {
        let state = Self {
            frontier: Frontier::new(),
            aggregator: Aggregator::new(expected_products),
        };
        state.frontier.enqueue(seed);
        state
    }

    /// True when the aggregated batch may be exported
    pub fn is_ready(&self) -> bool {
        self.aggregator.is_ready(self.frontier.is_complete())
    }
}
