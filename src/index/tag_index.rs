//! Tag Index for Filter-Based Record Lookup
//!
//! Maps `tag name -> tag value -> RecordSet`. Every record is appended to the
//! set of each `(name, value)` pair it carries, and to no other. The index only
//! grows: there is no removal or re-keying path.
//!
//! # Filter Resolution
//!
//! A query supplies a conjunction of exact-match filters:
//!
//! - **no filters**: the full store contents, borrowed as-is
//! - **one filter**: the pair's set, borrowed as-is (O(1) expected lookup)
//! - **several filters**: if any pair was never seen the result is empty.
//!   Otherwise the smallest resolved set is the pivot; each pivot record is
//!   kept only if every other resolved set contains it. Cost is
//!   `O(min |S_i|)` membership tests per filter instead of a scan over all
//!   records. Combined-tag sets are not precomputed.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use datastream_tsdb::index::TagIndex;
//! use datastream_tsdb::storage::RecordSet;
//! use datastream_tsdb::types::{MetricRecord, Tag, TagSet};
//!
//! let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
//! let record = Arc::new(MetricRecord::new(1, date, "online.spent", 10.0));
//! let tags = TagSet::new().with("location", "Chicago").with("gender", "F");
//!
//! let mut index = TagIndex::new();
//! index.index(&record, &tags);
//!
//! let all: RecordSet = std::iter::once(record.clone()).collect();
//! let filters = vec![Tag::new("location", "Chicago"), Tag::new("gender", "F")];
//! let matched = index.resolve(&filters, &all);
//! assert!(matched.contains(1));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::RecordSet;
use crate::types::{MetricRecord, Tag, TagSet};

// ============================================================================
// Tag Index
// ============================================================================

/// Two-level mapping from tag name and tag value to the records carrying them
#[derive(Debug, Default)]
pub struct TagIndex {
    /// tag name -> tag value -> records
    tags: HashMap<String, HashMap<String, RecordSet>>,

    /// Number of distinct (name, value) pairs
    combinations: usize,
}

impl TagIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
            combinations: 0,
        }
    }

    /// Add a record under every tag it carries
    ///
    /// Intermediate mappings are created on demand.
    pub fn index(&mut self, record: &Arc<MetricRecord>, tags: &TagSet) {
        for (name, value) in tags.iter() {
            let values = self.tags.entry(name.to_string()).or_default();
            let set = values.entry(value.to_string()).or_insert_with(|| {
                self.combinations += 1;
                RecordSet::new()
            });
            set.insert(Arc::clone(record));
        }
    }

    /// Look up the records carrying `name = value`
    ///
    /// `None` is a normal outcome for a tag name or value never observed.
    pub fn lookup(&self, name: &str, value: &str) -> Option<&RecordSet> {
        self.tags.get(name)?.get(value)
    }

    /// Resolve a conjunction of filters to the matching records
    ///
    /// `all` is returned for an empty filter list. Zero and one filter
    /// borrow existing sets; two or more produce a transient intersection.
    pub fn resolve<'a>(&'a self, filters: &[Tag], all: &'a RecordSet) -> Cow<'a, RecordSet> {
        match filters {
            [] => Cow::Borrowed(all),
            [filter] => match self.lookup(filter.name(), filter.value()) {
                Some(set) => Cow::Borrowed(set),
                None => Cow::Owned(RecordSet::new()),
            },
            _ => Cow::Owned(self.intersect(filters)),
        }
    }

    /// Pivot-based intersection over two or more filters
    fn intersect(&self, filters: &[Tag]) -> RecordSet {
        let mut sets = Vec::with_capacity(filters.len());
        for filter in filters {
            // A filter that matches nothing empties the whole conjunction
            match self.lookup(filter.name(), filter.value()) {
                Some(set) => sets.push(set),
                None => return RecordSet::new(),
            }
        }

        let Some((pivot_idx, pivot)) = sets
            .iter()
            .enumerate()
            .min_by_key(|(_, set)| set.len())
            .map(|(idx, set)| (idx, *set))
        else {
            return RecordSet::new();
        };

        pivot
            .iter()
            .filter(|record| {
                sets.iter()
                    .enumerate()
                    .all(|(idx, set)| idx == pivot_idx || set.contains(record.id))
            })
            .cloned()
            .collect()
    }

    /// Number of distinct tag names
    pub fn tag_name_count(&self) -> usize {
        self.tags.len()
    }

    /// Number of distinct (name, value) pairs
    pub fn combination_count(&self) -> usize {
        self.combinations
    }
}

// ============================================================================
// Tests
// ============================================================================
