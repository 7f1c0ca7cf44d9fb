//! Configuration for market data tools

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockmate_utils::env;

/// Fallback KRW-per-USD rate used when the live rate cannot be fetched
pub const DEFAULT_FALLBACK_CONVERSION_RATE: f64 = 1350.0;

/// Currency pair used to convert foreign quotes
pub const DEFAULT_FX_PAIR: &str = "USDKRW=X";

/// Hard ceiling on news items per report
pub const MAX_NEWS_ITEMS: usize = 3;

/// Environment variable overriding the fallback conversion rate
pub const FALLBACK_RATE_VAR: &str = "STOCKMATE_FALLBACK_RATE";
/// Environment variable overriding the conversion pair
pub const FX_PAIR_VAR: &str = "STOCKMATE_FX_PAIR";
/// Environment variable overriding the HTTP timeout (seconds)
pub const TIMEOUT_VAR: &str = "STOCKMATE_TIMEOUT_SECS";

/// Configuration for market data tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// ISO code of the currency reports are denominated in
    pub local_currency: String,

    /// Provider symbol of the foreign/local pair (local amount per 1 foreign unit)
    pub fx_pair: String,

    /// Rate substituted when the live conversion rate is unavailable
    pub fallback_conversion_rate: f64,

    /// Calendar days of closes requested per quote
    pub history_window_days: u32,

    /// News items per report
    pub news_limit: usize,

    /// Upper bound on a single tool response, in bytes
    pub max_response_bytes: usize,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// User agent sent to the data provider
    pub user_agent: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            local_currency: "KRW".to_string(),
            fx_pair: DEFAULT_FX_PAIR.to_string(),
            fallback_conversion_rate: DEFAULT_FALLBACK_CONVERSION_RATE,
            // covers weekends and holidays while still yielding two closes
            history_window_days: 7,
            news_limit: MAX_NEWS_ITEMS,
            max_response_bytes: 24_000,
            request_timeout: Duration::from_secs(10),
            user_agent: concat!("Mozilla/5.0 (compatible; stockmate/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Apply overrides from the process environment
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(rate) = env::parse_var::<f64>(FALLBACK_RATE_VAR)? {
            self.fallback_conversion_rate = rate;
        }
        if let Some(pair) = env::parse_var::<String>(FX_PAIR_VAR)? {
            self.fx_pair = pair;
        }
        if let Some(secs) = env::parse_var::<u64>(TIMEOUT_VAR)? {
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.fallback_conversion_rate.is_finite() || self.fallback_conversion_rate <= 0.0 {
            return Err(MarketError::ConfigError(format!(
                "fallback_conversion_rate must be a positive number, got {}",
                self.fallback_conversion_rate
            )));
        }

        if self.fx_pair.trim().is_empty() {
            return Err(MarketError::ConfigError("fx_pair must not be empty".to_string()));
        }

        if self.local_currency.len() != 3 || !self.local_currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(MarketError::ConfigError(format!(
                "local_currency must be a 3-letter ISO code, got '{}'",
                self.local_currency
            )));
        }

        if self.history_window_days < 2 {
            return Err(MarketError::ConfigError(
                "history_window_days must be at least 2".to_string(),
            ));
        }

        if self.news_limit == 0 || self.news_limit > MAX_NEWS_ITEMS {
            return Err(MarketError::ConfigError(format!(
                "news_limit must be between 1 and {MAX_NEWS_ITEMS}"
            )));
        }

        if self.max_response_bytes < 1024 {
            return Err(MarketError::ConfigError(
                "max_response_bytes must be at least 1024".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    local_currency: Option<String>,
    fx_pair: Option<String>,
    fallback_conversion_rate: Option<f64>,
    history_window_days: Option<u32>,
    news_limit: Option<usize>,
    max_response_bytes: Option<usize>,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl MarketConfigBuilder {
    /// Set the local currency code
    pub fn local_currency(mut self, code: impl Into<String>) -> Self {
        self.local_currency = Some(code.into());
        self
    }

    /// Set the conversion pair symbol
    pub fn fx_pair(mut self, pair: impl Into<String>) -> Self {
        self.fx_pair = Some(pair.into());
        self
    }

    /// Set the fallback conversion rate
    pub fn fallback_conversion_rate(mut self, rate: f64) -> Self {
        self.fallback_conversion_rate = Some(rate);
        self
    }

    /// Set the price history window
    pub fn history_window_days(mut self, days: u32) -> Self {
        self.history_window_days = Some(days);
        self
    }

    /// Set the number of news items per report
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the response size cap
    pub fn max_response_bytes(mut self, bytes: usize) -> Self {
        self.max_response_bytes = Some(bytes);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the provider user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            local_currency: self.local_currency.unwrap_or(defaults.local_currency),
            fx_pair: self.fx_pair.unwrap_or(defaults.fx_pair),
            fallback_conversion_rate: self
                .fallback_conversion_rate
                .unwrap_or(defaults.fallback_conversion_rate),
            history_window_days: self.history_window_days.unwrap_or(defaults.history_window_days),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            max_response_bytes: self.max_response_bytes.unwrap_or(defaults.max_response_bytes),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}
