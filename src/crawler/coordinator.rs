//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier
//! - Dispatching tasks to a bounded pool of fetch workers
//! - Classifying pages, enqueueing links and extracting records
//! - Completion detection and cancellation
//! - The single export at the end of a run

use crate::config::{validate, Config};
use crate::crawler::extractor::{ExtractError, RecordExtractor};
use crate::crawler::fetcher::{build_http_client, fetch_with_retries, FetchResult};
use crate::crawler::parser::classify_document;
use crate::output::{CrawlStatistics, Exporter};
use crate::state::{CrawlPhase, CrawlState, CrawlTask, TaskOutcome};
use crate::url::CrawlScope;
use crate::{Result, SweepError};
use reqwest::Client;
use scraper::Html;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Per-task counters
    pub stats: CrawlStatistics,

    /// Whether the seed page itself could be fetched
    pub seed_fetched: bool,

    /// Records held by the aggregator, ready for export
    pub records: usize,
}

/// Everything a worker needs, shared by `Arc`
struct WorkerContext {
    client: Client,
    scope: CrawlScope,
    extractor: RecordExtractor,
    state: Arc<CrawlState>,
    retries: u32,
}

/// What a worker hands back to the coordinator
struct TaskReport {
    seq: u64,
    url: Url,
    outcome: TaskOutcome,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<WorkerContext>,
    seed: Url,
    max_concurrent: usize,
    phase: CrawlPhase,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator with the seed URL already enqueued
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, in phase `Init`
    /// * `Err(SweepError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let scope = CrawlScope::from_config(&config.site)?;
        let seed = scope.base().join(&config.site.seed_path)?;
        let extractor = RecordExtractor::new(&config.selectors)?;
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let state = Arc::new(CrawlState::seeded(
            seed.clone(),
            config.crawler.expected_products,
        ));

        tracing::debug!("Seeded frontier with {}", seed);

        Ok(Self {
            context: Arc::new(WorkerContext {
                client,
                scope,
                extractor,
                state,
                retries: config.crawler.retries,
            }),
            seed,
            max_concurrent: config.crawler.max_concurrent_fetches as usize,
            phase: CrawlPhase::Init,
            stats: CrawlStatistics::default(),
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn seed_url(&self) -> &Url {
        &self.seed
    }

    /// Shared crawl state (frontier and aggregator)
    pub fn state(&self) -> &CrawlState {
        &self.context.state
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(SweepError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Runs the crawl loop until the batch is ready or `cancel` fires
    ///
    /// The loop:
    /// 1. Fills the worker pool from the frontier
    /// 2. Waits for one worker to finish and folds its outcome into the stats
    /// 3. Stops when nothing is pending or in flight, or when the expected
    ///    product count is reached (remaining workers are aborted)
    ///
    /// Cancellation aborts in-flight workers and returns
    /// `SweepError::Cancelled`; the run can no longer be exported.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<CrawlOutcome> {
        self.transition(CrawlPhase::Crawling)?;
        tracing::info!("Starting crawl at {}", self.seed);

        let start_time = Instant::now();
        let mut workers: JoinSet<TaskReport> = JoinSet::new();
        let mut seed_fetched = false;
        let mut pages_done: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return self.cancel(workers).await;
            }

            if self.state().aggregator.expected_reached() {
                tracing::info!(
                    "Collected the expected {} products, stopping",
                    self.state().aggregator.len()
                );
                break;
            }

            while workers.len() < self.max_concurrent {
                let Some(task) = self.state().frontier.next() else {
                    break;
                };
                tracing::debug!("Dispatching #{}: {}", task.seq, task.url);
                let context = Arc::clone(&self.context);
                workers.spawn(async move { process_task(&context, task).await });
            }

            if workers.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return self.cancel(workers).await;
                }
                joined = workers.join_next() => {
                    let report = match joined {
                        Some(Ok(report)) => report,
                        Some(Err(e)) => {
                            tracing::error!("Crawl worker failed: {}", e);
                            continue;
                        }
                        None => continue,
                    };

                    if report.seq == 0 && report.outcome.is_fetched() {
                        seed_fetched = true;
                    }
                    tracing::trace!("Finished {}: {:?}", report.url, report.outcome);
                    self.stats.record(&report.outcome);

                    pages_done += 1;
                    if pages_done % 10 == 0 {
                        let elapsed = start_time.elapsed();
                        tracing::info!(
                            "Progress: {} pages done, {} pending, {} records, {:.2} pages/sec",
                            pages_done,
                            self.state().frontier.pending_len(),
                            self.state().aggregator.len(),
                            pages_done as f64 / elapsed.as_secs_f64()
                        );
                    }
                }
            }
        }

        // Only non-empty when the expected count cut the crawl short
        workers.shutdown().await;

        if !self.state().is_ready() {
            tracing::warn!(
                "Finishing with {} fetches unaccounted for",
                self.state().frontier.in_flight()
            );
        }

        self.transition(CrawlPhase::Complete)?;
        self.stats.duration = start_time.elapsed();
        // Records accepted early may have been evicted by earlier-discovered ones
        self.stats.records = self.state().aggregator.len() as u64;

        if !seed_fetched {
            tracing::error!("Could not fetch the seed page {}", self.seed);
        }

        tracing::info!(
            "Crawl completed: {} pages fetched, {} records in {:?}",
            self.stats.pages_fetched,
            self.state().aggregator.len(),
            self.stats.duration
        );

        Ok(CrawlOutcome {
            stats: self.stats.clone(),
            seed_fetched,
            records: self.state().aggregator.len(),
        })
    }

    async fn cancel(&mut self, mut workers: JoinSet<TaskReport>) -> Result<CrawlOutcome> {
        tracing::warn!(
            "Crawl cancelled, abandoning {} in-flight fetches",
            workers.len()
        );
        workers.shutdown().await;
        self.transition(CrawlPhase::Cancelled)?;
        Err(SweepError::Cancelled)
    }

    /// Writes the aggregated records to `destination`
    ///
    /// Allowed once, after [`Coordinator::run`] completed. A failed write
    /// leaves the run in `Complete` and is returned to the caller.
    pub fn export(&mut self, exporter: &dyn Exporter, destination: &Path) -> Result<usize> {
        if !self.phase.can_transition_to(CrawlPhase::Exported) {
            return Err(SweepError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::Exported,
            });
        }

        let records = self.state().aggregator.snapshot();
        let written = exporter.export_all(&records, destination)?;
        self.transition(CrawlPhase::Exported)?;

        tracing::info!("Exported {} records to {}", written, destination.display());
        Ok(written)
    }
}

/// Fetches one task and processes the page; never fails
async fn process_task(context: &WorkerContext, mut task: CrawlTask) -> TaskReport {
    let result = fetch_with_retries(&context.client, &mut task, context.retries).await;

    let outcome = match result {
        FetchResult::Success {
            html, final_url, ..
        } => {
            if context.state.frontier.claim(&task, &final_url) {
                process_page(context, &task, &html, &final_url)
            } else {
                tracing::debug!("{} redirected to already visited {}", task.url, final_url);
                TaskOutcome::Duplicate
            }
        }
        FetchResult::Failure { kind, message } => {
            tracing::warn!(
                "Error fetching {} after {} attempt(s): {}",
                task.url,
                task.attempts,
                message
            );
            TaskOutcome::FetchFailed { kind }
        }
    };

    context.state.frontier.finish(&task);

    TaskReport {
        seq: task.seq,
        url: task.url,
        outcome,
    }
}

/// Classifies a fetched page, enqueues its links and extracts a record from
/// product pages
fn process_page(context: &WorkerContext, task: &CrawlTask, html: &str, page_url: &Url) -> TaskOutcome {
    let document = Html::parse_document(html);
    let page = classify_document(&document, page_url, &context.scope);

    let links_found = page.links.len();
    let links_enqueued = page
        .links
        .into_iter()
        .filter(|link| context.state.frontier.enqueue(link.clone()))
        .count();
    tracing::debug!(
        "{}: {} product links, {} new",
        page_url,
        links_found,
        links_enqueued
    );

    if !page.is_product {
        return TaskOutcome::Listing { links_enqueued };
    }

    let captured_at = capture_time();
    match context
        .extractor
        .extract_document(&document, page_url, &captured_at)
    {
        Ok(record) => {
            tracing::debug!("Extracted '{}' ({}) from {}", record.name, record.price, page_url);
            let accepted = context.state.aggregator.add(record, task.seq);
            TaskOutcome::Product {
                links_enqueued,
                accepted,
            }
        }
        Err(e) => {
            tracing::warn!("Skipping product page: {}", e);
            let ExtractError::IncompleteRecord { missing, .. } = e;
            TaskOutcome::Incomplete {
                links_enqueued,
                missing,
            }
        }
    }
}

/// Local wall-clock time as `HH:MM`
fn capture_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
