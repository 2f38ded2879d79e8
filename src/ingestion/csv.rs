//! CSV Row Parser
//!
//! Turns one line of the source dataset into a [`MetricRecord`] and its
//! [`TagSet`], driven by the column layout in [`DatasetConfig`].
//!
//! # Format
//!
//! ```text
//! CustomerID,Gender,Location,...,Transaction_Date,...,Avg_Price,...
//! 17850,M,Chicago,...,2019-01-01,...,153.71,...
//! ```
//!
//! Fields are comma separated. A field may be wrapped in double quotes, in
//! which case it can contain commas and line breaks, and `""` stands for a
//! literal quote.
//!
//! # Field Rules
//!
//! - **id**: integer; a fractional suffix (`17850.0`) is dropped before parsing
//! - **value**: float, required
//! - **timestamp**: date in the configured chrono format, required
//! - **tags**: one tag per configured column whose trimmed content is non-empty

use chrono::NaiveDate;

use crate::config::{DatasetConfig, TagColumn};
use crate::error::IngestionError;
use crate::types::{MetricRecord, RecordId, TagSet};

/// Split one CSV record into fields
///
/// Handles quoted fields and doubled quotes inside them. A quoted field may
/// contain line breaks. An unterminated quote is reported as an error message.
pub fn parse_csv_line(line: &str) -> Result<Vec<String>, String> {
    let (fields, in_quotes) = split_fields(line);
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    Ok(fields)
}

/// Whether `text` ends inside a quoted field
///
/// A record for which this holds continues on the next physical line.
pub fn has_open_quote(text: &str) -> bool {
    split_fields(text).1
}

fn split_fields(line: &str) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
        } else {
            match ch {
                ',' => fields.push(std::mem::take(&mut field)),
                '"' if field.is_empty() => in_quotes = true,
                '\r' if chars.peek().is_none() => {}
                _ => field.push(ch),
            }
        }
    }

    fields.push(field);
    (fields, in_quotes)
}

/// Parses dataset rows according to a column layout
#[derive(Debug, Clone)]
pub struct CsvRecordParser {
    metric_name: String,
    id_column: usize,
    timestamp_column: usize,
    value_column: usize,
    date_format: String,
    tags: Vec<TagColumn>,
}

impl CsvRecordParser {
    /// Build a parser from the dataset configuration
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            metric_name: config.metric_name.clone(),
            id_column: config.id_column,
            timestamp_column: config.timestamp_column,
            value_column: config.value_column,
            date_format: config.date_format.clone(),
            tags: config.tags.clone(),
        }
    }

    /// Parse a row already split into fields
    pub fn parse_row<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<(MetricRecord, TagSet), IngestionError> {
        let id = parse_id(required(fields, self.id_column, "id")?)?;
        let timestamp = self.parse_date(required(fields, self.timestamp_column, "timestamp")?)?;
        let value = parse_value(required(fields, self.value_column, "value")?)?;

        let mut tags = TagSet::new();
        for tag in &self.tags {
            let raw = column(fields, tag.column, &tag.name)?.trim();
            // An empty tag column means the record does not carry that tag
            if !raw.is_empty() {
                tags.add(tag.name.clone(), raw);
            }
        }

        Ok((
            MetricRecord::new(id, timestamp, self.metric_name.clone(), value),
            tags,
        ))
    }

    /// Split and parse a raw line
    pub fn parse_line(
        &self,
        line: &str,
        line_number: usize,
    ) -> Result<(MetricRecord, TagSet), IngestionError> {
        let fields = parse_csv_line(line).map_err(|message| IngestionError::MalformedRow {
            line: line_number,
            message,
        })?;
        self.parse_row(&fields)
    }

    fn parse_date(&self, raw: &str) -> Result<NaiveDate, IngestionError> {
        NaiveDate::parse_from_str(raw, &self.date_format).map_err(|_| {
            IngestionError::InvalidDate {
                value: raw.to_string(),
                format: self.date_format.clone(),
            }
        })
    }
}

fn column<'a, S: AsRef<str>>(
    fields: &'a [S],
    index: usize,
    name: &str,
) -> Result<&'a str, IngestionError> {
    fields
        .get(index)
        .map(AsRef::as_ref)
        .ok_or_else(|| IngestionError::MissingColumn {
            column: name.to_string(),
            index,
        })
}

fn required<'a, S: AsRef<str>>(
    fields: &'a [S],
    index: usize,
    name: &str,
) -> Result<&'a str, IngestionError> {
    let raw = column(fields, index, name)?.trim();
    if raw.is_empty() {
        return Err(IngestionError::EmptyField(name.to_string()));
    }
    Ok(raw)
}

fn parse_id(raw: &str) -> Result<RecordId, IngestionError> {
    let integral = match raw.rfind('.') {
        Some(dot) if dot > 0 => &raw[..dot],
        _ => raw,
    };
    integral
        .parse()
        .map_err(|_| IngestionError::InvalidId(raw.to_string()))
}

fn parse_value(raw: &str) -> Result<f64, IngestionError> {
    raw.parse()
        .map_err(|_| IngestionError::InvalidValue(raw.to_string()))
}
