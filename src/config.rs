//! Configuration management
//!
//! This module provides configuration file support with TOML format,
//! environment variable overrides, and defaults matching the bundled
//! e-commerce dataset.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ValidationError};
use crate::types::FILTER_SEPARATOR;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Source dataset layout
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// CORS allowed origins (empty = allow any origin)
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// Layout of the CSV dataset streamed at startup
///
/// Column indices are zero-based.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Path to the CSV file
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Whether the first line is a header row
    #[serde(default = "default_true")]
    pub has_header: bool,

    /// Name of the single metric carried by the dataset
    #[serde(default = "default_metric_name")]
    pub metric_name: String,

    /// Column holding the record identifier
    #[serde(default = "default_id_column")]
    pub id_column: usize,

    /// Column holding the record date
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: usize,

    /// Column holding the metric value
    #[serde(default = "default_value_column")]
    pub value_column: usize,

    /// chrono format of the date column
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Columns indexed as tags
    #[serde(default = "default_tags")]
    pub tags: Vec<TagColumn>,
}

/// A dataset column exposed as a tag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TagColumn {
    /// Tag name used in filters
    pub name: String,

    /// Zero-based column index
    pub column: usize,
}

impl TagColumn {
    /// Create a tag column mapping
    pub fn new(name: impl Into<String>, column: usize) -> Self {
        Self {
            name: name.into(),
            column,
        }
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_log_level() -> String { "info".to_string() }
fn default_dataset_path() -> PathBuf { PathBuf::from("./data/dataset.csv") }
fn default_metric_name() -> String { "online.spent".to_string() }
fn default_id_column() -> usize { 0 }
fn default_timestamp_column() -> usize { 6 }
fn default_value_column() -> usize { 11 }
fn default_date_format() -> String { "%Y-%m-%d".to_string() }
fn default_true() -> bool { true }

fn default_tags() -> Vec<TagColumn> {
    vec![
        TagColumn::new("gender", 2),
        TagColumn::new("location", 3),
        TagColumn::new("product_category", 9),
        TagColumn::new("coupon_status", 13),
        TagColumn::new("coupon_code", 19),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            has_header: true,
            metric_name: default_metric_name(),
            id_column: default_id_column(),
            timestamp_column: default_timestamp_column(),
            value_column: default_value_column(),
            date_format: default_date_format(),
            tags: default_tags(),
        }
    }
}

impl ServerConfig {
    /// `host:port` listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Load a file and apply environment variable overrides
    pub fn load_with_env(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment variable overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DATASTREAM_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("DATASTREAM_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(path) = std::env::var("DATASTREAM_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            self.server.log_level = log_level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ValidationError::Failed("Server port cannot be 0".to_string()).into());
        }

        if self.dataset.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingField("dataset.path".to_string()).into());
        }

        if self.dataset.metric_name.is_empty() {
            return Err(ValidationError::MissingField("dataset.metric_name".to_string()).into());
        }

        let mut seen = HashSet::new();
        for tag in &self.dataset.tags {
            if tag.name.is_empty() {
                return Err(ValidationError::MissingField("dataset.tags.name".to_string()).into());
            }
            if tag.name.contains(FILTER_SEPARATOR) {
                return Err(ValidationError::InvalidFormat {
                    field: "dataset.tags.name".to_string(),
                    message: format!("'{}' contains '{}'", tag.name, FILTER_SEPARATOR),
                }
                .into());
            }
            if !seen.insert(tag.name.as_str()) {
                return Err(ValidationError::Failed(format!(
                    "Duplicate tag name '{}'",
                    tag.name
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
