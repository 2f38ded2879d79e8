//! Calendar-Aligned Time Partitioning
//!
//! Groups records into day, week or month buckets keyed by the bucket start
//! (midnight UTC). Buckets are created on demand, so every bucket in the
//! result holds at least one record, and records keep their input order
//! within a bucket.
//!
//! Weeks start on Sunday.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use datastream_tsdb::aggregation::TimeScale;
//! use datastream_tsdb::types::MetricRecord;
//!
//! let records: Vec<Arc<MetricRecord>> = [(1, 3), (2, 17), (3, 28)]
//!     .into_iter()
//!     .map(|(id, day)| {
//!         let date = NaiveDate::from_ymd_opt(2019, 5, day).unwrap();
//!         Arc::new(MetricRecord::new(id, date, "online.spent", 1.0))
//!     })
//!     .collect();
//!
//! assert_eq!(TimeScale::Monthly.partition(&records).len(), 1);
//! assert_eq!(TimeScale::Daily.partition(&records).len(), 3);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::MetricRecord;

/// First day of a week bucket
pub const WEEK_START: Weekday = Weekday::Sun;

/// Records grouped by bucket start
pub type Partitions<'a> = HashMap<DateTime<Utc>, Vec<&'a MetricRecord>>;

/// Bucket width used to partition records before aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeScale {
    /// One bucket per calendar day
    Daily,

    /// One bucket per week, starting on [`WEEK_START`]
    Weekly,

    /// One bucket per calendar month
    #[default]
    Monthly,
}

impl TimeScale {
    /// All scales, in increasing width
    pub const ALL: [TimeScale; 3] = [TimeScale::Daily, TimeScale::Weekly, TimeScale::Monthly];

    /// Map an external scale name, falling back to [`TimeScale::Monthly`]
    ///
    /// Unknown or missing names are not errors.
    pub fn from_request(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// External name of the scale
    pub fn name(&self) -> &'static str {
        match self {
            TimeScale::Daily => "Daily",
            TimeScale::Weekly => "Weekly",
            TimeScale::Monthly => "Monthly",
        }
    }

    /// Start of the bucket containing `date`, as midnight UTC
    pub fn bucket_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let day = match self {
            TimeScale::Daily => date,
            TimeScale::Weekly => start_of_week(date),
            TimeScale::Monthly => date.with_day(1).unwrap_or(date),
        };
        Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
    }

    /// Group records by bucket start
    pub fn partition<'a>(&self, records: &'a [Arc<MetricRecord>]) -> Partitions<'a> {
        let mut partitions: Partitions<'a> = HashMap::new();
        for record in records {
            partitions
                .entry(self.bucket_start(record.timestamp))
                .or_default()
                .push(record.as_ref());
        }
        partitions
    }
}

/// Step back one day at a time until the week start is reached
fn start_of_week(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while day.weekday() != WEEK_START {
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    day
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScale(pub String);

impl FromStr for TimeScale {
    type Err = UnknownScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(TimeScale::Daily),
            "Weekly" => Ok(TimeScale::Weekly),
            "Monthly" => Ok(TimeScale::Monthly),
            other => Err(UnknownScale(other.to_string())),
        }
    }
}
