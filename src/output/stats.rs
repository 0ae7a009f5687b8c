//! Crawl statistics
//!
//! Counters are fed one finished task at a time by the coordinator and
//! printed by the binary once the run ends.

use crate::state::TaskOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Fetched pages that were not product pages
    pub listing_pages: u64,

    /// Fetched pages matching the product pattern
    pub product_pages: u64,

    /// Records accepted by the aggregator
    pub records: u64,

    /// Product pages skipped for missing fields
    pub incomplete_records: u64,

    /// Fetches that redirected onto an already visited page
    pub duplicates: u64,

    /// New URLs added to the frontier
    pub links_enqueued: u64,

    /// Abandoned fetches, keyed by failure kind
    pub fetch_failures: BTreeMap<String, u64>,

    /// Wall-clock duration of the crawl
    pub duration: Duration,
}

impl CrawlStatistics {
    /// Folds one finished task into the counters
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Listing { links_enqueued } => {
                self.pages_fetched += 1;
                self.listing_pages += 1;
                self.links_enqueued += *links_enqueued as u64;
            }
            TaskOutcome::Product {
                links_enqueued,
                accepted,
            } => {
                self.pages_fetched += 1;
                self.product_pages += 1;
                self.links_enqueued += *links_enqueued as u64;
                if *accepted {
                    self.records += 1;
                }
            }
            TaskOutcome::Incomplete { links_enqueued, .. } => {
                self.pages_fetched += 1;
                self.product_pages += 1;
                self.incomplete_records += 1;
                self.links_enqueued += *links_enqueued as u64;
            }
            TaskOutcome::Duplicate => {
                self.pages_fetched += 1;
                self.duplicates += 1;
            }
            TaskOutcome::FetchFailed { kind } => {
                *self.fetch_failures.entry(kind.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Total abandoned fetches
    pub fn total_failures(&self) -> u64 {
        self.fetch_failures.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Listing pages: {}", stats.listing_pages);
    println!("  Product pages: {}", stats.product_pages);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!("  Redirect duplicates: {}", stats.duplicates);
    println!();

    println!("Records:");
    println!("  Exported: {}", stats.records);
    println!("  Skipped (incomplete): {}", stats.incomplete_records);
    println!();

    if !stats.fetch_failures.is_empty() {
        println!("Fetch Failures ({}):", stats.total_failures());
        for (kind, count) in &stats.fetch_failures {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    let secs = stats.duration.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.pages_fetched as f64 / secs
    } else {
        0.0
    };
    println!("Duration: {:.2}s ({:.2} pages/sec)", secs, rate);
}
