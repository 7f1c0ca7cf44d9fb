//! Application-level configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::env;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_VAR: &str = "STOCKMATE_LOG_FORMAT";

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value was present but could not be used
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Output format of the log layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'text' or 'json'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name, also reported as the MCP server name
    pub app_name: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Filter directives used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "StockMate".to_string(),
            log_format: LogFormat::Text,
            default_filter: "warn,stockmate_cli=info,stockmate_mcp=info,stockmate_market=info".to_string(),
        }
    }
}

impl Config {
    /// Apply overrides from the process environment
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Some(format) = env::parse_var::<LogFormat>(LOG_FORMAT_VAR)? {
            self.log_format = format;
        }
        Ok(self)
    }
}
