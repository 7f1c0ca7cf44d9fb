//! Market data provider boundary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Closing prices for a symbol over a recent window, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, closes: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            closes,
        }
    }

    /// A series with no data, returned for unknown symbols
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Most recent close
    pub fn latest(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Close before the most recent one
    pub fn prior(&self) -> Option<f64> {
        self.closes.len().checked_sub(2).map(|i| self.closes[i])
    }
}

/// Descriptive metadata for a symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub currency: Option<String>,
}

impl SymbolMetadata {
    /// `long_name`, else `short_name`, else the symbol itself
    pub fn display_name(&self, symbol: &str) -> String {
        [self.long_name.as_deref(), self.short_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .unwrap_or(symbol)
            .to_string()
    }
}

/// Resolve the display name from optional metadata
pub fn display_name(metadata: Option<&SymbolMetadata>, symbol: &str) -> String {
    metadata.map_or_else(|| symbol.to_string(), |m| m.display_name(symbol))
}

/// A news headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub publisher: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Source of prices, metadata and headlines
///
/// Every call goes to the network; implementations keep no cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily closes over the last `window_days` calendar days
    ///
    /// An unknown symbol yields an empty series rather than an error.
    async fn price_history(&self, symbol: &str, window_days: u32) -> Result<PriceSeries>;

    /// Descriptive metadata, `None` when the provider knows nothing about the symbol
    async fn metadata(&self, symbol: &str) -> Result<Option<SymbolMetadata>>;

    /// Most recent headlines mentioning the symbol, newest first
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;
}
