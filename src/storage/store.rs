//! Append-Only Record Store
//!
//! Owns every ingested record for the lifetime of the process. There is no
//! removal path. Identifiers must be unique: adding a record whose id is
//! already present is rejected with [`IngestionError::DuplicateRecord`] and
//! leaves the store untouched, so the ordered list and the presence set can
//! never disagree.

use std::sync::Arc;

use crate::error::IngestionError;
use crate::types::{MetricRecord, RecordId};

use super::record_set::RecordSet;

/// Insertion-ordered collection of all ingested records
#[derive(Debug, Default)]
pub struct RecordStore {
    all: RecordSet,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            all: RecordSet::new(),
        }
    }

    /// Append a record and mark its identifier present
    ///
    /// Returns the shared handle that indexes should reference.
    pub fn add(&mut self, record: MetricRecord) -> Result<Arc<MetricRecord>, IngestionError> {
        if self.all.contains(record.id) {
            return Err(IngestionError::DuplicateRecord(record.id));
        }
        let record = Arc::new(record);
        self.all.insert(Arc::clone(&record));
        Ok(record)
    }

    /// O(1) membership test by identifier
    pub fn contains(&self, id: RecordId) -> bool {
        self.all.contains(id)
    }

    /// All records in insertion order
    pub fn records(&self) -> &[Arc<MetricRecord>] {
        self.all.records()
    }

    /// The full contents as a record set (used for zero-filter queries)
    pub fn as_record_set(&self) -> &RecordSet {
        &self.all
    }

    /// Number of stored records
    pub fn size(&self) -> usize {
        self.all.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
