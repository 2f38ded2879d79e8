//! Bucket Aggregation Functions
//!
//! Reduces the records of one time bucket to a single output point.
//!
//! - **Count**: number of records
//! - **Sum**: sum of values, truncated to two decimals
//! - **Avg**: sum divided by count, the quotient truncated to two decimals
//!
//! Truncation is toward zero (`trunc(v * 100) / 100`), not round-to-nearest;
//! downstream consumers compare against values produced this way.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MetricRecord, TimeDataPoint};

// ============================================================================
// Aggregator
// ============================================================================

/// Aggregation applied to every bucket of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Aggregator {
    /// Number of records in the bucket
    #[default]
    Count,

    /// Sum of record values
    Sum,

    /// Mean of record values
    Avg,
}

impl Aggregator {
    /// All aggregators
    pub const ALL: [Aggregator; 3] = [Aggregator::Count, Aggregator::Sum, Aggregator::Avg];

    /// Map an external aggregator name, falling back to [`Aggregator::Count`]
    pub fn from_request(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// External name of the aggregator
    pub fn name(&self) -> &'static str {
        match self {
            Aggregator::Count => "Count",
            Aggregator::Sum => "Sum",
            Aggregator::Avg => "Avg",
        }
    }

    /// Reduce one bucket to an output point
    ///
    /// Partitioning never yields an empty bucket. Should one reach `Avg`
    /// anyway the value is `0.0` rather than a division by zero.
    pub fn aggregate(&self, timestamp: DateTime<Utc>, records: &[&MetricRecord]) -> TimeDataPoint {
        let value = match self {
            Aggregator::Count => records.len() as f64,
            Aggregator::Sum => truncate_to_cents(sum(records)),
            Aggregator::Avg => {
                if records.is_empty() {
                    0.0
                } else {
                    truncate_to_cents(sum(records) / records.len() as f64)
                }
            }
        };
        TimeDataPoint::new(timestamp, value)
    }
}

fn sum(records: &[&MetricRecord]) -> f64 {
    records.iter().map(|r| r.value).sum()
}

/// Truncate toward zero to two decimal places
pub fn truncate_to_cents(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name an aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAggregator(pub String);

impl FromStr for Aggregator {
    type Err = UnknownAggregator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Count" => Ok(Aggregator::Count),
            "Sum" => Ok(Aggregator::Sum),
            "Avg" => Ok(Aggregator::Avg),
            other => Err(UnknownAggregator(other.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn records(values: &[f64]) -> Vec<MetricRecord> {
        let date = NaiveDate::from_ymd_opt(2019, 3, 10).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricRecord::new(i as u64, date, "online.spent", *v))
            .collect()
    }

    fn bucket() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap()
    }

    fn run(aggregator: Aggregator, values: &[f64]) -> f64 {
        let owned = records(values);
        let refs: Vec<&MetricRecord> = owned.iter().collect();
        aggregator.aggregate(bucket(), &refs).value
    }

    #[test]
    fn test_from_request() {
        assert_eq!(Aggregator::from_request("Sum"), Aggregator::Sum);
        assert_eq!(Aggregator::from_request("Avg"), Aggregator::Avg);
        assert_eq!(Aggregator::from_request("Count"), Aggregator::Count);
        assert_eq!(Aggregator::from_request("Median"), Aggregator::Count);
        assert_eq!(Aggregator::from_request(""), Aggregator::Count);
    }

    #[test]
    fn test_count() {
        assert_eq!(run(Aggregator::Count, &[10.0, 20.0, 30.0]), 3.0);
    }

    #[test]
    fn test_sum() {
        assert_eq!(run(Aggregator::Sum, &[10.0, 20.0, 30.0]), 60.0);
    }

    #[test]
    fn test_avg() {
        assert_eq!(run(Aggregator::Avg, &[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn test_sum_truncates_instead_of_rounding() {
        assert_eq!(run(Aggregator::Sum, &[1.005, 2.0]), 3.0);
        assert_eq!(run(Aggregator::Sum, &[0.129]), 0.12);
    }

    #[test]
    fn test_avg_truncates_the_quotient() {
        // 10 / 3 = 3.333.. -> 3.33
        assert_eq!(run(Aggregator::Avg, &[3.0, 3.0, 4.0]), 3.33);
        // 2 / 3 = 0.666.. -> 0.66, not 0.67
        assert_eq!(run(Aggregator::Avg, &[0.0, 1.0, 1.0]), 0.66);
    }

    #[test]
    fn test_truncation_is_toward_zero() {
        assert_eq!(truncate_to_cents(-1.239), -1.23);
        assert_eq!(truncate_to_cents(1.239), 1.23);
    }

    #[test]
    fn test_avg_of_empty_bucket() {
        assert_eq!(Aggregator::Avg.aggregate(bucket(), &[]).value, 0.0);
    }

    #[test]
    fn test_point_carries_bucket_timestamp() {
        let owned = records(&[1.0]);
        let refs: Vec<&MetricRecord> = owned.iter().collect();
        assert_eq!(Aggregator::Sum.aggregate(bucket(), &refs).timestamp, bucket());
    }
}
