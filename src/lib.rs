//! Datastream TSDB - in-memory tag index and time-bucketed aggregation engine
//!
//! This library ingests tagged metric records once at startup and answers
//! dashboard queries over them:
//! - Exact-match tag filters with pivot-based multi-filter intersection
//! - Day, week and month buckets aligned to the calendar (UTC)
//! - Count, Sum and Avg aggregation with two-decimal truncation
//! - Prefix search over every known `name:value` filter
//! - HTTP and WebSocket transport for the dashboard
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use datastream_tsdb::aggregation::{Aggregator, TimeScale};
//! use datastream_tsdb::engine::MetricProcessor;
//! use datastream_tsdb::types::{MetricRecord, Tag, TagSet};
//!
//! let processor = MetricProcessor::new();
//! for (id, value) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
//!     let date = NaiveDate::from_ymd_opt(2019, 3, id as u32).unwrap();
//!     let record = MetricRecord::new(id, date, "online.spent", value);
//!     processor
//!         .ingest(record, TagSet::new().with("location", "Chicago"))
//!         .unwrap();
//! }
//!
//! let points = processor.query(
//!     &[Tag::new("location", "Chicago")],
//!     TimeScale::Monthly,
//!     Aggregator::Sum,
//! );
//! assert_eq!(points.len(), 1);
//! assert_eq!(points[0].value, 60.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod storage;
pub mod types;

/// Configuration management with TOML support
pub mod config;

/// Time partitioning and bucket aggregation
pub mod aggregation;

/// The shared engine instance: ingestion entry point, queries and statistics
pub mod engine;

/// CSV dataset streaming into the engine
pub mod ingestion;

/// HTTP and WebSocket transport
pub mod api;

// Re-export main types
pub use aggregation::{Aggregator, TimeScale};
pub use engine::{MetricProcessor, ProcessorStats};
pub use error::{Error, Result};
pub use types::{MetricRecord, RecordId, Tag, TagSet, TimeDataPoint};
