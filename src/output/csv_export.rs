//! CSV export
//!
//! Rows carry name, price, image reference, source URL and capture time in
//! that order, with no header row. Quoting follows RFC 4180 via the `csv`
//! crate.

use crate::output::traits::{ExportError, ExportResult, Exporter, ProductRecord};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes records as header-less CSV
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// Serializes records into CSV bytes without touching the filesystem
    pub fn to_bytes(&self, records: &[ProductRecord]) -> ExportResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        for record in records {
            writer.serialize(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
    }
}

impl Exporter for CsvExporter {
    fn export_all(&self, records: &[ProductRecord], destination: &Path) -> ExportResult<usize> {
        let bytes = self.to_bytes(records)?;

        let mut file = File::create(destination).map_err(|e| ExportError::io(destination, e))?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|e| ExportError::io(destination, e))?;

        tracing::debug!(
            "Wrote {} rows ({} bytes) to {}",
            records.len(),
            bytes.len(),
            destination.display()
        );

        Ok(records.len())
    }
}

/// Returns `<directory>/<YYYY-MM-DD>.csv`
pub fn export_path(directory: &Path, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.csv", date.format("%Y-%m-%d")))
}

/// Creates the export directory (and parents) if it does not exist
pub fn ensure_directory(directory: &Path) -> ExportResult<()> {
    std::fs::create_dir_all(directory).map_err(|e| ExportError::io(directory, e))
}
