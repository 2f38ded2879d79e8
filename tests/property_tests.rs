//! Property Tests for Indexing, Catalog Search and Partitioning
//!
//! Uses property-based testing (proptest) to check the engine against
//! brute-force reference computations over randomly generated datasets.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use proptest::prelude::*;

use datastream_tsdb::{
    aggregation::{Aggregator, TimeScale},
    engine::MetricProcessor,
    index::{FilterTrie, TagIndex},
    storage::RecordSet,
    types::{MetricRecord, RecordId, Tag, TagSet},
};

// =============================================================================
// Test Data Strategies
// =============================================================================

const LOCATIONS: [&str; 3] = ["Chicago", "California", "New York"];
const GENDERS: [&str; 2] = ["F", "M"];
const COUPONS: [&str; 2] = ["SAVE10", "ELEC20"];

/// One generated row: location, gender, optional coupon, day offset, value in cents
type Row = (usize, usize, Option<usize>, i64, u32);

fn row() -> impl Strategy<Value = Row> {
    (
        0..LOCATIONS.len(),
        0..GENDERS.len(),
        prop::option::of(0..COUPONS.len()),
        0i64..730,
        0u32..100_000,
    )
}

fn rows(max: usize) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(row(), 0..max)
}

/// Strategy for filter sets drawn from the same small vocabulary
fn filters() -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(
        prop_oneof![
            (0..LOCATIONS.len()).prop_map(|i| Tag::new("location", LOCATIONS[i])),
            (0..GENDERS.len()).prop_map(|i| Tag::new("gender", GENDERS[i])),
            (0..COUPONS.len()).prop_map(|i| Tag::new("coupon_code", COUPONS[i])),
            Just(Tag::new("location", "Boston")),
        ],
        0..4,
    )
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 6, 1).unwrap()
}

fn materialize(rows: &[Row]) -> Vec<(Arc<MetricRecord>, TagSet)> {
    rows.iter()
        .enumerate()
        .map(|(i, &(loc, gender, coupon, day, cents))| {
            let date = base_date() + Duration::days(day);
            let record = MetricRecord::new(i as RecordId, date, "online.spent", cents as f64 / 100.0);
            let mut tags = TagSet::new()
                .with("location", LOCATIONS[loc])
                .with("gender", GENDERS[gender]);
            if let Some(c) = coupon {
                tags.add("coupon_code", COUPONS[c]);
            }
            (Arc::new(record), tags)
        })
        .collect()
}

fn build_index(data: &[(Arc<MetricRecord>, TagSet)]) -> (TagIndex, RecordSet) {
    let mut index = TagIndex::new();
    let mut all = RecordSet::new();
    for (record, tags) in data {
        index.index(record, tags);
        all.insert(Arc::clone(record));
    }
    (index, all)
}

// =============================================================================
// Tag Index
// =============================================================================

mod tag_index {
    use super::*;

    proptest! {
        /// Every record is found under each of its tags
        #[test]
        fn every_tag_lookup_contains_record(rows in rows(200)) {
            let data = materialize(&rows);
            let (index, all) = build_index(&data);

            for (record, tags) in &data {
                prop_assert!(all.contains(record.id));
                for (name, value) in tags.iter() {
                    let set = index.lookup(name, value);
                    prop_assert!(set.is_some_and(|s| s.contains(record.id)));
                }
            }
        }

        /// Resolution returns exactly the records satisfying every filter
        #[test]
        fn resolution_is_sound_and_complete(rows in rows(200), filters in filters()) {
            let data = materialize(&rows);
            let (index, all) = build_index(&data);

            let resolved: HashSet<RecordId> =
                index.resolve(&filters, &all).iter().map(|r| r.id).collect();
            let expected: HashSet<RecordId> = data
                .iter()
                .filter(|(_, tags)| filters.iter().all(|f| tags.matches(f)))
                .map(|(r, _)| r.id)
                .collect();

            prop_assert_eq!(resolved, expected);
        }

        /// Filter order does not change the result
        #[test]
        fn resolution_is_order_independent(rows in rows(100), filters in filters()) {
            let data = materialize(&rows);
            let (index, all) = build_index(&data);

            let mut reversed = filters.clone();
            reversed.reverse();

            let a: BTreeSet<RecordId> = index.resolve(&filters, &all).iter().map(|r| r.id).collect();
            let b: BTreeSet<RecordId> = index.resolve(&reversed, &all).iter().map(|r| r.id).collect();
            prop_assert_eq!(a, b);
        }
    }
}

// =============================================================================
// Filter Trie
// =============================================================================

mod trie {
    use super::*;

    proptest! {
        /// Prefix search returns exactly the inserted words with that prefix, once each
        #[test]
        fn prefix_search_matches_brute_force(
            words in prop::collection::vec("[a-c:]{0,6}", 0..50),
            prefix in "[a-c:]{0,3}"
        ) {
            let mut trie = FilterTrie::new();
            for w in &words {
                trie.insert(w);
            }

            let found = trie.search_prefix(&prefix);
            let unique: BTreeSet<&String> = found.iter().collect();
            prop_assert_eq!(unique.len(), found.len());

            let expected: BTreeSet<&String> =
                words.iter().filter(|w| w.starts_with(prefix.as_str())).collect();
            prop_assert_eq!(unique, expected);
        }

        /// The empty prefix enumerates every distinct word
        #[test]
        fn empty_prefix_lists_everything(words in prop::collection::vec("[a-z]{0,8}", 0..50)) {
            let mut trie = FilterTrie::new();
            for w in &words {
                trie.insert(w);
            }

            let found: Vec<String> = trie.search_prefix("");
            let distinct: BTreeSet<&String> = words.iter().collect();
            prop_assert_eq!(found.len(), distinct.len());
            prop_assert_eq!(trie.len(), distinct.len());
        }
    }
}

// =============================================================================
// Partitioning and Queries
// =============================================================================

mod partition {
    use super::*;

    fn scale() -> impl Strategy<Value = TimeScale> {
        prop::sample::select(TimeScale::ALL.to_vec())
    }

    fn aggregator() -> impl Strategy<Value = Aggregator> {
        prop::sample::select(Aggregator::ALL.to_vec())
    }

    /// Matching values grouped by bucket start, in ingestion order
    fn reference_buckets(
        rows: &[Row],
        filters: &[Tag],
        scale: TimeScale,
    ) -> BTreeMap<DateTime<Utc>, Vec<f64>> {
        let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
        for (record, tags) in materialize(rows) {
            if filters.iter().all(|f| tags.matches(f)) {
                buckets
                    .entry(scale.bucket_start(record.timestamp))
                    .or_default()
                    .push(record.value);
            }
        }
        buckets
    }

    fn truncated(value: f64) -> f64 {
        (value * 100.0).trunc() / 100.0
    }

    proptest! {
        /// Buckets are disjoint, non-empty and cover the input exactly
        #[test]
        fn buckets_partition_the_input(rows in rows(200), scale in scale()) {
            let data = materialize(&rows);
            let records: Vec<Arc<MetricRecord>> = data.iter().map(|(r, _)| Arc::clone(r)).collect();

            let partitions = scale.partition(&records);
            let mut seen = HashSet::new();
            for (start, bucket) in &partitions {
                prop_assert!(!bucket.is_empty());
                for record in bucket {
                    prop_assert!(seen.insert(record.id));
                    prop_assert_eq!(scale.bucket_start(record.timestamp), *start);
                    prop_assert!(start.date_naive() <= record.timestamp);
                }
                match scale {
                    TimeScale::Daily => {},
                    TimeScale::Weekly => prop_assert_eq!(start.weekday(), Weekday::Sun),
                    TimeScale::Monthly => prop_assert_eq!(start.day(), 1),
                }
            }
            prop_assert_eq!(seen.len(), records.len());
        }

        /// Query output is strictly increasing by bucket and counts add up
        #[test]
        fn query_output_is_sorted(
            rows in rows(200),
            filters in filters(),
            scale in scale(),
            aggregator in aggregator()
        ) {
            let processor = MetricProcessor::new();
            for (record, tags) in materialize(&rows) {
                processor.ingest(record.as_ref().clone(), tags).unwrap();
            }

            let points = processor.query(&filters, scale, aggregator);
            prop_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

            let counts = processor.query(&filters, scale, Aggregator::Count);
            prop_assert_eq!(counts.len(), points.len());
            let matched = materialize(&rows)
                .iter()
                .filter(|(_, tags)| filters.iter().all(|f| tags.matches(f)))
                .count();
            let total: f64 = counts.iter().map(|p| p.value).sum();
            prop_assert_eq!(total, matched as f64);
        }

        /// Sum and Avg match a brute-force recomputation per bucket
        #[test]
        fn sum_and_avg_match_reference(
            rows in rows(200),
            filters in filters(),
            scale in scale()
        ) {
            let processor = MetricProcessor::new();
            for (record, tags) in materialize(&rows) {
                processor.ingest(record.as_ref().clone(), tags).unwrap();
            }

            let expected = reference_buckets(&rows, &filters, scale);
            let sums = processor.query(&filters, scale, Aggregator::Sum);
            let avgs = processor.query(&filters, scale, Aggregator::Avg);
            prop_assert_eq!(sums.len(), expected.len());
            prop_assert_eq!(avgs.len(), expected.len());

            for ((start, values), (sum, avg)) in expected.iter().zip(sums.iter().zip(&avgs)) {
                let total: f64 = values.iter().sum();
                prop_assert_eq!(sum.timestamp, *start);
                prop_assert_eq!(avg.timestamp, *start);
                prop_assert_eq!(sum.value, truncated(total));
                prop_assert_eq!(avg.value, truncated(total / values.len() as f64));
            }
        }
    }
}
