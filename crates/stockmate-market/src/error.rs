//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
///
/// Each variant is one failure class; tools turn them into user-facing text at
/// their own boundary.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Symbol unknown, or too few price points to compute a change
    #[error("Data not available for {symbol}: {points} price point(s)")]
    DataInsufficiency { symbol: String, points: usize },

    /// Network, HTTP or parse failure talking to the data provider
    #[error("Market data provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The reference currency rate could not be fetched
    #[error("Conversion rate unavailable: {0}")]
    ConversionRateUnavailable(String),

    /// Arithmetic on the inputs would fault (division by zero, non-finite values)
    #[error("Invalid arithmetic input: {0}")]
    InvalidArithmeticInput(String),

    /// An argument value is out of range or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        MarketError::ProviderUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::ProviderUnavailable(format!("unexpected response format: {err}"))
    }
}

impl From<stockmate_utils::ConfigError> for MarketError {
    fn from(err: stockmate_utils::ConfigError) -> Self {
        MarketError::ConfigError(err.to_string())
    }
}

/// Convert MarketError to a tool error
impl From<MarketError> for stockmate_tools::ToolError {
    fn from(err: MarketError) -> Self {
        stockmate_tools::ToolError::ExecutionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::DataInsufficiency {
            symbol: "XYZ".to_string(),
            points: 1,
        };
        assert_eq!(err.to_string(), "Data not available for XYZ: 1 price point(s)");

        let err = MarketError::InvalidArithmeticInput("buy price is zero".to_string());
        assert_eq!(err.to_string(), "Invalid arithmetic input: buy price is zero");
    }

    #[test]
    fn test_error_conversion() {
        let err: stockmate_tools::ToolError =
            MarketError::ProviderUnavailable("timeout".to_string()).into();

        match err {
            stockmate_tools::ToolError::ExecutionFailed(msg) => {
                assert!(msg.contains("timeout"));
            }
            _ => panic!("Expected ExecutionFailed variant"),
        }
    }

    #[test]
    fn test_json_error_is_provider_failure() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: MarketError = json_err.into();
        assert!(matches!(err, MarketError::ProviderUnavailable(_)));
    }
}
