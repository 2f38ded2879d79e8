//! Insertion-Ordered Record Set
//!
//! A `RecordSet` is the unit the tag index hands out: every distinct
//! `(tag name, tag value)` pair owns one, and the store keeps one holding
//! every record. It combines two views of the same records:
//!
//! - a `Vec` preserving insertion order, used for iteration and partitioning
//! - a `HashSet` of identifiers, used for O(1) membership tests during
//!   multi-filter intersection
//!
//! Records are shared through `Arc`, so cloning a set (or building a transient
//! intersection) never copies record payloads.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{MetricRecord, RecordId};

/// Collection of records with ordered iteration and O(1) membership
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Records in insertion order
    records: Vec<Arc<MetricRecord>>,

    /// Identifiers of all records in `records`
    ids: HashSet<RecordId>,
}

impl RecordSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Create an empty set with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Append a record
    ///
    /// Returns false without modifying the set when a record with the same
    /// identifier is already present, so the set never holds duplicates.
    pub fn insert(&mut self, record: Arc<MetricRecord>) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// O(1) membership test by record identifier
    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Arc<MetricRecord>] {
        &self.records
    }

    /// Iterate over records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<MetricRecord>> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Arc<MetricRecord>;
    type IntoIter = std::slice::Iter<'a, Arc<MetricRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Arc<MetricRecord>> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Arc<MetricRecord>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = RecordSet::with_capacity(iter.size_hint().0);
        for record in iter {
            set.insert(record);
        }
        set
    }
}
