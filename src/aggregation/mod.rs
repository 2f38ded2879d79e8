//! Time Partitioning and Aggregation
//!
//! A query result is produced in two pure steps over the resolved records:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Resolved record set          │
//! └─────────────────────────────────────┘
//!                  ↓
//! ┌─────────────────────────────────────┐
//! │   TimeScale::partition              │
//! │   day / week / month buckets        │
//! └─────────────────────────────────────┘
//!                  ↓
//! ┌─────────────────────────────────────┐
//! │   Aggregator::aggregate             │
//! │   one point per non-empty bucket    │
//! └─────────────────────────────────────┘
//! ```
//!
//! Both strategies are closed enums selected from external names; unknown
//! names fall back to `Monthly` and `Count`.

pub mod functions;
pub mod partition;

pub use functions::{truncate_to_cents, Aggregator, UnknownAggregator};
pub use partition::{Partitions, TimeScale, UnknownScale, WEEK_START};
