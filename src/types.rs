//! Core data types used throughout the engine
//!
//! This module defines the fundamental data structures shared by the store,
//! the indexes and the query path:
//!
//! # Key Types
//!
//! - **`MetricRecord`**: A single immutable measurement (id, date, metric name, value)
//! - **`RecordId`**: Identifier of a record, unique within the store
//! - **`Tag`**: A `(name, value)` pair, also the parsed form of a query filter
//! - **`TagSet`**: The tags attached to one record, at most one value per name
//! - **`TimeDataPoint`**: One aggregated output point (bucket start + value)
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use datastream_tsdb::types::{MetricRecord, Tag, TagSet};
//!
//! let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
//! let record = MetricRecord::new(1, date, "online.spent", 153.71);
//!
//! let mut tags = TagSet::new();
//! tags.add("location", "Chicago");
//!
//! let filter = Tag::parse_filter("location:Chicago").unwrap();
//! assert_eq!(tags.get(filter.name()), Some(filter.value()));
//! assert_eq!(record.id, 1);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::FilterError;

/// Separator between tag name and tag value in the external filter form
pub const FILTER_SEPARATOR: char = ':';

/// Unique identifier for a metric record
pub type RecordId = u64;

/// A single ingested measurement
///
/// Records are created once by the ingestion collaborator and never mutated.
/// The store owns them behind an `Arc`; every index entry shares that
/// allocation rather than copying the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Identifier, unique within the store
    pub id: RecordId,

    /// Calendar date of the measurement (no time-of-day component)
    pub timestamp: NaiveDate,

    /// Metric name, constant for a deployment (e.g. `online.spent`)
    pub name: String,

    /// Measured value
    pub value: f64,
}

impl MetricRecord {
    /// Create a new record
    pub fn new(id: RecordId, timestamp: NaiveDate, name: impl Into<String>, value: f64) -> Self {
        Self {
            id,
            timestamp,
            name: name.into(),
            value,
        }
    }
}

/// A tag name/value pair
///
/// The same type is used for tags observed on records and for parsed query
/// filters; a filter is an exact-match constraint on one tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    value: String,
}

impl Tag {
    /// Create a tag from its name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the external `"name:value"` filter form
    ///
    /// The string is split at the first `:`, so tag values may themselves
    /// contain colons. A string without any `:` is a caller error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datastream_tsdb::types::Tag;
    ///
    /// let tag = Tag::parse_filter("coupon_code:SAVE10").unwrap();
    /// assert_eq!(tag.name(), "coupon_code");
    /// assert_eq!(tag.value(), "SAVE10");
    ///
    /// assert!(Tag::parse_filter("coupon_code").is_err());
    /// ```
    pub fn parse_filter(filter: &str) -> Result<Self, FilterError> {
        match filter.split_once(FILTER_SEPARATOR) {
            Some((name, value)) => Ok(Self::new(name, value)),
            None => Err(FilterError::MissingSeparator(filter.to_string())),
        }
    }

    /// Parse a list of filter strings, failing on the first malformed one
    pub fn parse_filters<S: AsRef<str>>(filters: &[S]) -> Result<Vec<Self>, FilterError> {
        filters.iter().map(|f| Self::parse_filter(f.as_ref())).collect()
    }

    /// Tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as the external `"name:value"` filter string
    pub fn as_filter(&self) -> String {
        format!("{}{}{}", self.name, FILTER_SEPARATOR, self.value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, FILTER_SEPARATOR, self.value)
    }
}

/// Set of tags attached to a single record
///
/// Keyed by tag name, so a record can never carry two values for the same
/// tag: adding a name a second time replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    tags: BTreeMap<String, String>,
}

impl TagSet {
    /// Create a new empty tag set
    pub fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Add a tag, replacing any previous value for the same name
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`TagSet::add`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Get a tag value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Check whether the set satisfies an exact-match filter
    pub fn matches(&self, filter: &Tag) -> bool {
        self.get(filter.name()) == Some(filter.value())
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if the set has no tags
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (name, value) in iter {
            set.add(name, value);
        }
        set
    }
}

/// One aggregated output point
///
/// `timestamp` is the start of the bucket (midnight UTC); serialized as an
/// RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDataPoint {
    /// Bucket start instant
    pub timestamp: DateTime<Utc>,

    /// Aggregated value
    pub value: f64,
}

impl TimeDataPoint {
    /// Create a new output point
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_filter() {
        let tag = Tag::parse_filter("location:Chicago").unwrap();
        assert_eq!(tag.name(), "location");
        assert_eq!(tag.value(), "Chicago");
        assert_eq!(tag.as_filter(), "location:Chicago");
        assert_eq!(tag.to_string(), "location:Chicago");
    }

    #[test]
    fn test_parse_filter_splits_at_first_colon() {
        let tag = Tag::parse_filter("url:http://host").unwrap();
        assert_eq!(tag.name(), "url");
        assert_eq!(tag.value(), "http://host");
    }

    #[test]
    fn test_parse_filter_missing_separator() {
        let err = Tag::parse_filter("location").unwrap_err();
        assert_eq!(err, FilterError::MissingSeparator("location".to_string()));
    }

    #[test]
    fn test_parse_filters_fails_on_first_bad_entry() {
        let ok = Tag::parse_filters(&["gender:F", "location:Chicago"]).unwrap();
        assert_eq!(ok.len(), 2);

        assert!(Tag::parse_filters(&["gender:F", "oops"]).is_err());
    }

    #[test]
    fn test_tag_set_one_value_per_name() {
        let mut tags = TagSet::new();
        tags.add("gender", "F");
        tags.add("gender", "M");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("gender"), Some("M"));
    }

    #[test]
    fn test_tag_set_matches() {
        let tags: TagSet = [("gender", "F"), ("location", "Chicago")]
            .into_iter()
            .collect();
        assert!(tags.matches(&Tag::new("location", "Chicago")));
        assert!(!tags.matches(&Tag::new("location", "California")));
        assert!(!tags.matches(&Tag::new("coupon_code", "SAVE10")));
    }

    #[test]
    fn test_time_data_point_serializes_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_string(&TimeDataPoint::new(ts, 60.0)).unwrap();
        assert_eq!(json, r#"{"timestamp":"2019-03-01T00:00:00Z","value":60.0}"#);
    }
}
