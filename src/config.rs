//! Mapper configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!     "enum_representation": "as_numeric",
//!     "timestamp_representation": "as_utc_time",
//!     "cache_schemas": true,
//!     "log_level": "warn"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversion::{EnumRepresentation, FormatContext, TimestampRepresentation};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Process configuration for registries, schema caching and logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Default enum representation (default: as_string)
    #[serde(default)]
    pub enum_representation: EnumRepresentation,

    /// Default timestamp representation (default: as_local_time)
    #[serde(default)]
    pub timestamp_representation: TimestampRepresentation,

    /// Memoize built schemas per type (default: false)
    #[serde(default)]
    pub cache_schemas: bool,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            enum_representation: EnumRepresentation::default(),
            timestamp_representation: TimestampRepresentation::default(),
            cache_schemas: false,
            log_level: default_log_level(),
        }
    }
}

impl MapperConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        let path_text = path.display().to_string();
        log_event_with_fields(Severity::Info, Event::ConfigLoaded, &[("path", path_text.as_str())]);
        Ok(config)
    }

    /// Parse configuration from JSON text and validate it.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: MapperConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        // Date-only drops the time of day from every timestamp written without a context.
        if self.timestamp_representation.is_date_only() {
            return Err(ConfigError::Invalid(
                "timestamp_representation 'as_date' cannot be a default".to_string(),
            ));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Format applied by registries when the caller passes no context
    pub fn default_format(&self) -> FormatContext {
        FormatContext::enums(self.enum_representation).with_timestamp(self.timestamp_representation)
    }

    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// Sets the process-wide minimum log severity from this configuration.
    pub fn apply_logging(&self) {
        Logger::set_min_severity(self.log_severity());
    }
}
