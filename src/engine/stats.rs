//! Engine statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// Query Counters
// ============================================================================

/// Counters updated on the read path
#[derive(Debug, Default)]
pub struct QueryCounters {
    /// Data queries served
    pub queries: AtomicU64,

    /// Data queries that produced no points
    pub empty_results: AtomicU64,

    /// Filter catalog searches served
    pub catalog_searches: AtomicU64,

    /// Records rejected because their id was already stored
    pub duplicate_records: AtomicU64,
}

impl QueryCounters {
    #[inline]
    pub(crate) fn record_query(&self, points: usize) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if points == 0 {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_catalog_search(&self) {
        self.catalog_searches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_duplicate(&self) {
        self.duplicate_records.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time view of the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorStats {
    /// Records in the store
    pub records: u64,
    /// Distinct tag names
    pub tag_names: u64,
    /// Distinct (name, value) pairs
    pub tag_values: u64,
    /// Filter strings in the catalog
    pub catalog_filters: u64,
    /// Records rejected because their id was already stored
    pub duplicate_records: u64,
    /// Data queries served
    pub queries_served: u64,
    /// Data queries with an empty result
    pub empty_results: u64,
    /// Catalog searches served
    pub catalog_searches: u64,
}

impl ProcessorStats {
    /// Human-readable multi-line rendering
    pub fn to_text(&self) -> String {
        format!(
            "records:          {}\n\
             tag names:        {}\n\
             tag values:       {}\n\
             catalog filters:  {}\n\
             duplicate ids:    {}\n\
             queries served:   {}\n\
             empty results:    {}\n\
             catalog searches: {}",
            self.records,
            self.tag_names,
            self.tag_values,
            self.catalog_filters,
            self.duplicate_records,
            self.queries_served,
            self.empty_results,
            self.catalog_searches,
        )
    }
}

impl QueryCounters {
    /// Copy the counters into a snapshot, leaving structure sizes at zero
    pub fn snapshot(&self) -> ProcessorStats {
        ProcessorStats {
            duplicate_records: self.duplicate_records.load(Ordering::Relaxed),
            queries_served: self.queries.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            catalog_searches: self.catalog_searches.load(Ordering::Relaxed),
            ..ProcessorStats::default()
        }
    }
}
