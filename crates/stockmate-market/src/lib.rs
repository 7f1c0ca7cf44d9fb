//! Market quote tools for StockMate
//!
//! This crate turns Yahoo Finance data into short chat reports:
//! - Stock quotes with daily change, converted to won for foreign symbols
//! - Single exchange rates and multi-currency briefings
//! - Latest headlines for a symbol
//! - Profit/loss cards for a holding
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockmate_market::{MarketConfig, YahooFinanceClient, register_market_tools};
//! use stockmate_tools::ToolRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(MarketConfig::default());
//! let provider = Arc::new(YahooFinanceClient::new(&config)?);
//!
//! let mut registry = ToolRegistry::new();
//! register_market_tools(&mut registry, provider, config)?;
//!
//! let report = registry
//!     .call("get_stock_report", serde_json::json!({ "symbol": "005930.KS" }))
//!     .await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fx;
pub mod investment;
pub mod quote;
pub mod report;
pub mod tools;

pub use api::{MarketDataProvider, NewsItem, PriceSeries, SymbolMetadata, YahooFinanceClient};
pub use config::{DEFAULT_FALLBACK_CONVERSION_RATE, MarketConfig};
pub use error::{MarketError, Result};
pub use quote::{ConversionRate, Direction, QuoteNormalizer, QuoteResult, RateSource, classify};
pub use report::{ChatFormatter, ReportFormatter};
pub use tools::{MarketContext, register_market_tools};
