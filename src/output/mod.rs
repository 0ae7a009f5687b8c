//! Output module: record accumulation, CSV export and run statistics
//!
//! This module handles:
//! - Collecting product records from concurrent workers
//! - Writing them to a dated CSV file
//! - Summarizing what the crawl did

mod aggregator;
mod csv_export;
pub mod stats;
mod traits;

pub use aggregator::Aggregator;
pub use csv_export::{ensure_directory, export_path, CsvExporter};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ExportError, ExportResult, Exporter, ProductRecord, RecordField};
