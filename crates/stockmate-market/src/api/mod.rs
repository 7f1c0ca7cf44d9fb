//! API clients for market data providers

pub mod provider;
pub mod yahoo;

#[cfg(test)]
pub use provider::MockMarketDataProvider;
pub use provider::{MarketDataProvider, NewsItem, PriceSeries, SymbolMetadata, display_name};
pub use yahoo::YahooFinanceClient;
