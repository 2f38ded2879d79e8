//! File Data Stream
//!
//! Reads the dataset record by record and hands every parsed row to a
//! [`StreamProcessor`]. The stream and the processor know nothing about each
//! other beyond that trait.
//!
//! A row that fails to parse or is rejected by the processor is logged and
//! counted; streaming continues with the next line. Only failing to open or
//! read the file aborts the stream.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DatasetConfig;
use crate::error::{Error, Result};
use crate::types::{MetricRecord, TagSet};

use super::csv::{has_open_quote, CsvRecordParser};

/// Consumer of parsed dataset rows
pub trait StreamProcessor {
    /// Accept one record with its tags
    fn process(&self, record: MetricRecord, tags: TagSet) -> Result<()>;
}

/// Outcome of streaming a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    /// Data records read (header and blank lines excluded)
    pub rows_read: usize,

    /// Rows accepted by the processor
    pub rows_ingested: usize,

    /// Rows that failed to parse or were rejected
    pub rows_rejected: usize,
}

/// Streams a CSV file into a processor
#[derive(Debug, Clone)]
pub struct FileDataStream {
    path: PathBuf,
    has_header: bool,
    parser: CsvRecordParser,
}

impl FileDataStream {
    /// Create a stream over the configured dataset
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            path: config.path.clone(),
            has_header: config.has_header,
            parser: CsvRecordParser::new(config),
        }
    }

    /// Stream the whole file into `processor`
    pub fn stream<P: StreamProcessor + ?Sized>(&self, processor: &P) -> Result<StreamReport> {
        let file = File::open(&self.path)?;
        info!(path = %self.path.display(), "Streaming dataset");
        self.stream_from(file, processor)
    }

    /// Stream from any reader (used for in-memory sources)
    pub fn stream_from<R: Read, P: StreamProcessor + ?Sized>(
        &self,
        reader: R,
        processor: &P,
    ) -> Result<StreamReport> {
        let start = Instant::now();
        let mut report = StreamReport::default();

        let mut lines = BufReader::new(reader).lines().enumerate();
        while let Some((idx, line)) = lines.next() {
            let mut line = line?;
            let line_number = idx + 1;

            // A quoted field may span physical lines
            while has_open_quote(&line) {
                match lines.next() {
                    Some((_, next)) => {
                        line.push('\n');
                        line.push_str(&next?);
                    }
                    None => break,
                }
            }

            if idx == 0 && self.has_header {
                debug!(header = %line, "Skipping header row");
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            report.rows_read += 1;

            let outcome = self
                .parser
                .parse_line(&line, line_number)
                .map_err(Error::from)
                .and_then(|(record, tags)| processor.process(record, tags));

            match outcome {
                Ok(()) => report.rows_ingested += 1,
                Err(e) => {
                    report.rows_rejected += 1;
                    warn!(line = line_number, error = %e, "Failed to process dataset row");
                }
            }
        }

        info!(
            rows_read = report.rows_read,
            rows_ingested = report.rows_ingested,
            rows_rejected = report.rows_rejected,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset streaming complete"
        );
        Ok(report)
    }
}
