//! Query engine: the shared processor instance and its statistics

pub mod processor;
pub mod stats;

pub use processor::MetricProcessor;
pub use stats::{ProcessorStats, QueryCounters};
