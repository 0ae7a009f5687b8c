//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed retry count
//! - Page classification and product link extraction
//! - Record extraction from product pages
//! - Overall crawl coordination and export

mod coordinator;
mod extractor;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use extractor::{ExtractError, RecordExtractor};
pub use fetcher::{build_http_client, fetch_page, fetch_with_retries, FetchErrorKind, FetchResult};
pub use parser::{classify, classify_document, ClassifiedPage};

use crate::config::Config;
use crate::output::CsvExporter;
use crate::Result;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and seed the frontier
/// 2. Fetch pages with a bounded worker pool
/// 3. Follow product links and extract records
/// 4. Write the records as CSV to `destination`
///
/// An unreachable seed still completes the run and writes an empty file;
/// check [`CrawlOutcome::seed_fetched`].
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `destination` - CSV file to write; its directory must exist
/// * `cancel` - Stops the crawl; a cancelled run writes nothing
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed and the file was written
/// * `Err(SweepError)` - Crawl failed or was cancelled
pub async fn crawl(
    config: Config,
    destination: &Path,
    cancel: CancellationToken,
) -> Result<CrawlOutcome> {
    let mut coordinator = Coordinator::new(config)?;
    let outcome = coordinator.run(cancel).await?;
    coordinator.export(&CsvExporter::new(), destination)?;
    Ok(outcome)
}
