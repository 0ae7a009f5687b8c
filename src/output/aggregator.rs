//! Record accumulation
//!
//! Workers finish in any order; each record carries the discovery sequence
//! number of its task so the snapshot can be returned in discovery order.

use crate::output::traits::ProductRecord;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe, append-only record store
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Mutex<Vec<(u64, ProductRecord)>>,
    expected: Option<usize>,
}

impl Aggregator {
    /// Creates an aggregator, optionally capped at an expected product count
    pub fn new(expected: Option<usize>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            expected,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, ProductRecord)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a record discovered at position `seq`
    ///
    /// With an expected count the batch holds the earliest-discovered records
    /// regardless of the order workers finish in: once full, a record with a
    /// lower `seq` evicts the latest-discovered one and a later record is
    /// refused. Returns whether `record` is held afterwards.
    pub fn add(&self, record: ProductRecord, seq: u64) -> bool {
        let mut records = self.lock();
        records.push((seq, record));

        let Some(expected) = self.expected else {
            return true;
        };
        if records.len() <= expected {
            return true;
        }

        let latest = records
            .iter()
            .enumerate()
            .max_by_key(|(_, (discovered, _))| *discovered)
            .map(|(index, _)| index);
        match latest {
            Some(index) => {
                let (evicted_seq, evicted) = records.swap_remove(index);
                tracing::debug!(
                    "Expected count {} reached, dropping {}",
                    expected,
                    evicted.source_url
                );
                evicted_seq != seq
            }
            None => true,
        }
    }

    /// True when the batch may be flushed
    ///
    /// An expected count, if configured, makes the batch ready as soon as
    /// it is reached. Otherwise readiness follows frontier exhaustion.
    pub fn is_ready(&self, frontier_complete: bool) -> bool {
        frontier_complete || self.expected_reached()
    }

    pub fn expected_reached(&self) -> bool {
        self.expected
            .is_some_and(|expected| self.lock().len() >= expected)
    }

    pub fn expected(&self) -> Option<usize> {
        self.expected
    }

    /// Records in discovery order; does not drain
    pub fn snapshot(&self) -> Vec<ProductRecord> {
        let mut records = self.lock().clone();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
