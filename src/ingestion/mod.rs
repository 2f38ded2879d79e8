//! Dataset Ingestion
//!
//! Streams the source CSV into the engine at startup.
//!
//! # Architecture
//!
//! ```text
//! [CSV file] → [FileDataStream] → [CsvRecordParser] → [StreamProcessor]
//!                    ↓                                       ↓
//!             [StreamReport]                       store + index + trie
//! ```
//!
//! # Components
//!
//! - **csv**: line splitting and row-to-record mapping
//! - **stream**: file reading, header/blank-line handling, per-row error accounting
//!
//! # Example
//!
//! ```rust,no_run
//! use datastream_tsdb::config::DatasetConfig;
//! use datastream_tsdb::engine::MetricProcessor;
//! use datastream_tsdb::ingestion::FileDataStream;
//!
//! # fn example() -> datastream_tsdb::Result<()> {
//! let processor = MetricProcessor::new();
//! let report = FileDataStream::new(&DatasetConfig::default()).stream(&processor)?;
//! println!("ingested {} rows", report.rows_ingested);
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod stream;

pub use csv::{parse_csv_line, CsvRecordParser};
pub use stream::{FileDataStream, StreamProcessor, StreamReport};
