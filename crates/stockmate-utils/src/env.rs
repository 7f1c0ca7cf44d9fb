//! Typed access to environment variables

use std::fmt::Display;
use std::str::FromStr;

use crate::config::ConfigError;

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank, and an error when
/// it is set to something that does not parse as `T`.
pub fn parse_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(None),
    }
}

/// Parse a raw value the same way [`parse_var`] does
pub fn parse_value<T>(key: &str, raw: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
