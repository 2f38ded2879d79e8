//! Metric Processor
//!
//! The single engine instance that owns the record store, the tag index and
//! the filter trie. It is constructed once at startup and shared as
//! `Arc<MetricProcessor>` between the ingestion stream and the transport.
//!
//! # Locking
//!
//! All three structures sit behind one `parking_lot::RwLock`. Ingestion takes
//! the write lock per record, so a record becomes visible in the store, the
//! index and the catalog at the same moment. Queries and catalog searches take
//! the read lock and run in parallel with each other.
//!
//! # Query Path
//!
//! ```text
//! filters ──► TagIndex::resolve ──► TimeScale::partition ──► Aggregator::aggregate ──► sort by bucket
//! ```

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::aggregation::{Aggregator, TimeScale};
use crate::config::DatasetConfig;
use crate::error::Result;
use crate::index::{FilterTrie, TagIndex};
use crate::ingestion::{FileDataStream, StreamProcessor, StreamReport};
use crate::storage::RecordStore;
use crate::types::{MetricRecord, RecordId, Tag, TagSet, TimeDataPoint};

use super::stats::{ProcessorStats, QueryCounters};

/// Structures mutated together on ingestion
#[derive(Debug, Default)]
struct EngineState {
    store: RecordStore,
    index: TagIndex,
    trie: FilterTrie,
}

/// In-memory metric engine
#[derive(Debug, Default)]
pub struct MetricProcessor {
    state: RwLock<EngineState>,
    counters: QueryCounters,
}

impl MetricProcessor {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine and stream the configured dataset into it
    pub fn from_dataset(config: &DatasetConfig) -> Result<(Arc<Self>, StreamReport)> {
        let processor = Arc::new(Self::new());
        let report = FileDataStream::new(config).stream(processor.as_ref())?;
        Ok((processor, report))
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Ingest one record with its tags
    ///
    /// A duplicate identifier is rejected before any structure is touched.
    /// Otherwise the record is appended to the store, indexed under every
    /// tag, and each `"name:value"` string is added to the filter catalog.
    pub fn ingest(&self, record: MetricRecord, tags: TagSet) -> Result<()> {
        let mut state = self.state.write();
        let record = match state.store.add(record) {
            Ok(record) => record,
            Err(e) => {
                self.counters.record_duplicate();
                return Err(e.into());
            }
        };

        state.index.index(&record, &tags);
        for (name, value) in tags.iter() {
            state.trie.insert(&Tag::new(name, value).as_filter());
        }
        Ok(())
    }

    /// Check whether a record id has been ingested
    pub fn contains(&self, id: RecordId) -> bool {
        self.state.read().store.contains(id)
    }

    /// Number of ingested records
    pub fn len(&self) -> usize {
        self.state.read().store.size()
    }

    /// Check if nothing has been ingested
    pub fn is_empty(&self) -> bool {
        self.state.read().store.is_empty()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Run a query over parsed filters
    ///
    /// Resolves the filters, partitions the candidates by `scale`, reduces
    /// every bucket with `aggregator` and returns the points in ascending
    /// bucket order. Filters that match nothing yield an empty result.
    pub fn query(
        &self,
        filters: &[Tag],
        scale: TimeScale,
        aggregator: Aggregator,
    ) -> Vec<TimeDataPoint> {
        let start = Instant::now();
        let state = self.state.read();

        let candidates = state.index.resolve(filters, state.store.as_record_set());
        let partitions = scale.partition(candidates.records());

        let mut points: Vec<TimeDataPoint> = partitions
            .iter()
            .map(|(bucket, records)| aggregator.aggregate(*bucket, records))
            .collect();
        // Partition map iteration order is arbitrary
        points.sort_by_key(|point| point.timestamp);

        debug!(
            filters = filters.len(),
            scale = %scale,
            aggregator = %aggregator,
            candidates = candidates.len(),
            buckets = points.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Query executed"
        );
        self.counters.record_query(points.len());
        points
    }

    /// Run a query from its external form
    ///
    /// Filter strings must be `"name:value"`; a string without the separator
    /// fails the whole request. Unknown scale and aggregator names fall back
    /// to `Monthly` and `Count`.
    pub fn query_request<S: AsRef<str>>(
        &self,
        filters: &[S],
        scale: &str,
        aggregator: &str,
    ) -> Result<Vec<TimeDataPoint>> {
        let filters = Tag::parse_filters(filters)?;
        Ok(self.query(
            &filters,
            TimeScale::from_request(scale),
            Aggregator::from_request(aggregator),
        ))
    }

    /// Known filter strings starting with `prefix`, unordered
    ///
    /// An empty prefix returns the whole catalog.
    pub fn filter_catalog(&self, prefix: &str) -> Vec<String> {
        let matches = self.state.read().trie.search_prefix(prefix);
        debug!(prefix = %prefix, matches = matches.len(), "Filter catalog search");
        self.counters.record_catalog_search();
        matches
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Snapshot of structure sizes and request counters
    pub fn stats(&self) -> ProcessorStats {
        let state = self.state.read();
        ProcessorStats {
            records: state.store.size() as u64,
            tag_names: state.index.tag_name_count() as u64,
            tag_values: state.index.combination_count() as u64,
            catalog_filters: state.trie.len() as u64,
            ..self.counters.snapshot()
        }
    }

    /// Log a one-line summary of the engine contents
    pub fn log_summary(&self) {
        let stats = self.stats();
        info!(
            records = stats.records,
            tag_names = stats.tag_names,
            tag_values = stats.tag_values,
            catalog_filters = stats.catalog_filters,
            "Metric processor ready"
        );
    }
}

impl StreamProcessor for MetricProcessor {
    fn process(&self, record: MetricRecord, tags: TagSet) -> Result<()> {
        self.ingest(record, tags)
    }
}

// ============================================================================
// Tests
// ============================================================================
