//! Error types for the metric engine

use thiserror::Error;

use crate::types::RecordId;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    /// Filter string error
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Ingestion error
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Filter string errors
///
/// Filters arrive from callers as `"tagName:tagValue"` strings. A string
/// without the separator cannot be turned into a lookup and is rejected
/// before any index access happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The `:` separator between tag name and tag value is missing
    #[error("Missing ':' separator in filter '{0}'")]
    MissingSeparator(String),
}

/// Ingestion errors
///
/// Produced while turning a source row into a record, or while handing a
/// record to the engine. A rejected row never reaches the index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestionError {
    /// A record with this identifier was already ingested
    #[error("Duplicate record id {0}")]
    DuplicateRecord(RecordId),

    /// The row is shorter than a column the schema requires
    #[error("Missing column '{column}' at index {index}")]
    MissingColumn {
        /// Logical column name from the schema
        column: String,
        /// Zero-based column index the schema points at
        index: usize,
    },

    /// A required field is present but empty
    #[error("Field '{0}' is empty")]
    EmptyField(String),

    /// Record identifier is not an integer
    #[error("Invalid record id '{0}'")]
    InvalidId(String),

    /// Metric value is not a number
    #[error("Invalid metric value '{0}'")]
    InvalidValue(String),

    /// Timestamp does not match the configured date format
    #[error("Invalid date '{value}': expected format {format}")]
    InvalidDate {
        /// Raw field content
        value: String,
        /// Expected chrono format string
        format: String,
    },

    /// Row could not be split into fields
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow {
        /// 1-indexed line number in the source
        line: usize,
        /// Description of the problem
        message: String,
    },
}

/// Validation errors
///
/// Error type for configuration validation
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid format
    #[error("Invalid format for {field}: {message}")]
    InvalidFormat {
        /// Field name being validated
        field: String,
        /// Description of the format error
        message: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    Failed(String),
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Configuration(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_converts() {
        let err: Error = FilterError::MissingSeparator("location".to_string()).into();
        assert!(matches!(err, Error::Filter(FilterError::MissingSeparator(_))));
        assert_eq!(
            err.to_string(),
            "Filter error: Missing ':' separator in filter 'location'"
        );
    }

    #[test]
    fn test_validation_error_becomes_configuration() {
        let err: Error = ValidationError::MissingField("dataset.path".to_string()).into();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
