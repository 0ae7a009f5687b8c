//! Exporter trait, record type and export errors

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// One product extracted from a product page
///
/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    pub image_ref: String,
    pub source_url: String,
    /// Local capture time, `HH:MM` 24-hour
    pub captured_at: String,
}

/// The fields a product page must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Price,
    ImageRef,
    SourceUrl,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::ImageRef => "image",
            Self::SourceUrl => "url",
        };
        write!(f, "{}", name)
    }
}

/// Trait for export backends
pub trait Exporter {
    /// Writes every record to `destination`, creating or replacing the file
    ///
    /// Returns the number of rows written.
    fn export_all(&self, records: &[ProductRecord], destination: &Path) -> ExportResult<usize>;
}
