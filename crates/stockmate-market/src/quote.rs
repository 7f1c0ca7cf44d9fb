//! Quote normalization and currency adjustment
//!
//! Every reporting tool runs the same pipeline: fetch a price series, check
//! that it has enough points, compute the change in the symbol's own
//! currency, and for foreign symbols convert the latest price with the
//! day's reference rate.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{MarketDataProvider, PriceSeries};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};

/// Exchange board suffixes that mark a symbol as domestic (KOSPI, KOSDAQ)
pub const DOMESTIC_SUFFIXES: [&str; 2] = [".KS", ".KQ"];

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// Unchanged close, common for thinly traded instruments
    Flat,
}

impl Direction {
    /// Classify a percentage change
    pub fn from_change(percent_change: f64) -> Self {
        if percent_change == 0.0 {
            Self::Flat
        } else if percent_change > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Change between the two most recent closes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub latest: f64,
    pub prior: f64,
    pub percent_change: f64,
    pub direction: Direction,
}

/// Where a conversion rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Most recent close of the reference pair
    Live,
    /// Configured constant used because the live rate was unavailable
    Fallback,
    /// Supplied by the caller
    Provided,
}

/// Local-currency amount per one unit of the foreign currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionRate {
    pub value: f64,
    pub source: RateSource,
}

impl ConversionRate {
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }

    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.value
    }
}

/// Normalized quote for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub symbol: String,
    pub latest_price: f64,
    pub prior_price: f64,
    /// Computed in the symbol's native currency
    pub percent_change: f64,
    pub direction: Direction,
    pub is_foreign: bool,
    /// Present iff `is_foreign`
    pub conversion: Option<ConversionRate>,
    /// `latest_price` converted to the local currency for foreign symbols
    pub display_price: f64,
}

impl QuoteResult {
    pub fn conversion_rate(&self) -> Option<f64> {
        self.conversion.map(|rate| rate.value)
    }
}

/// True unless the symbol carries a domestic board suffix
pub fn classify(symbol: &str) -> bool {
    let upper = symbol.trim().to_ascii_uppercase();
    !DOMESTIC_SUFFIXES.iter().any(|suffix| upper.ends_with(suffix))
}

/// Percentage change and direction between the last two closes
pub fn compute_change(series: &PriceSeries) -> Result<PriceChange> {
    let (Some(latest), Some(prior)) = (series.latest(), series.prior()) else {
        return Err(MarketError::DataInsufficiency {
            symbol: series.symbol.clone(),
            points: series.len(),
        });
    };

    if prior == 0.0 {
        return Err(MarketError::InvalidArithmeticInput(format!(
            "prior close of {} is zero",
            series.symbol
        )));
    }

    let percent_change = (latest - prior) / prior * 100.0;
    if !percent_change.is_finite() {
        return Err(MarketError::InvalidArithmeticInput(format!(
            "non-finite change for {}",
            series.symbol
        )));
    }

    Ok(PriceChange {
        latest,
        prior,
        percent_change,
        direction: Direction::from_change(percent_change),
    })
}

/// Builds [`QuoteResult`]s on top of a market data provider
#[derive(Clone)]
pub struct QuoteNormalizer {
    provider: Arc<dyn MarketDataProvider>,
    fx_pair: String,
    fallback_rate: f64,
    window_days: u32,
}

impl QuoteNormalizer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &MarketConfig) -> Self {
        Self {
            provider,
            fx_pair: config.fx_pair.clone(),
            fallback_rate: config.fallback_conversion_rate,
            window_days: config.history_window_days,
        }
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    /// Price window requested for every series
    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Fetch the series for a symbol
    pub async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        self.provider.price_history(symbol, self.window_days).await
    }

    /// Latest close of the reference pair, or the configured fallback
    ///
    /// Never fails: an outage only makes the conversion approximate.
    pub async fn fetch_conversion_rate(&self) -> ConversionRate {
        match self.fetch_live_rate().await {
            Ok(value) => {
                debug!(pair = %self.fx_pair, value, "Fetched conversion rate");
                ConversionRate {
                    value,
                    source: RateSource::Live,
                }
            }
            Err(e) => {
                warn!(pair = %self.fx_pair, fallback = self.fallback_rate, "{e}; using fallback rate");
                ConversionRate {
                    value: self.fallback_rate,
                    source: RateSource::Fallback,
                }
            }
        }
    }

    async fn fetch_live_rate(&self) -> Result<f64> {
        let series = self
            .provider
            .price_history(&self.fx_pair, self.window_days)
            .await
            .map_err(|e| MarketError::ConversionRateUnavailable(e.to_string()))?;

        series
            .latest()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| {
                MarketError::ConversionRateUnavailable(format!("no usable close for {}", self.fx_pair))
            })
    }

    /// Combine change computation and (for foreign symbols) conversion
    pub async fn build_quote_result(
        &self,
        symbol: &str,
        series: &PriceSeries,
        is_foreign: bool,
    ) -> Result<QuoteResult> {
        let change = compute_change(series)?;

        let conversion = if is_foreign {
            Some(self.fetch_conversion_rate().await)
        } else {
            None
        };

        let display_price = conversion.map_or(change.latest, |rate| rate.convert(change.latest));

        Ok(QuoteResult {
            symbol: symbol.to_string(),
            latest_price: change.latest,
            prior_price: change.prior,
            percent_change: change.percent_change,
            direction: change.direction,
            is_foreign,
            conversion,
            display_price,
        })
    }

    /// Fetch, classify and normalize a symbol in one call
    pub async fn quote(&self, symbol: &str) -> Result<QuoteResult> {
        let series = self.fetch_series(symbol).await?;
        self.build_quote_result(symbol, &series, classify(symbol)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use mockall::predicate::eq;

    fn normalizer(mock: MockMarketDataProvider) -> QuoteNormalizer {
        QuoteNormalizer::new(Arc::new(mock), &MarketConfig::default())
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::new(symbol, closes.to_vec())
    }

    #[test]
    fn test_classify() {
        assert!(!classify("005930.KS"));
        assert!(!classify("035720.kq"));
        assert!(classify("AAPL"));
        assert!(classify("USDKRW=X"));
        assert!(classify("7203.T"));
        assert!(classify("KS"));
    }

    #[test]
    fn test_change_up() {
        let change = compute_change(&series("X", &[100.0, 110.0])).unwrap();
        assert!((change.percent_change - 10.0).abs() < 1e-9);
        assert_eq!(change.direction, Direction::Up);
        assert_eq!(change.latest, 110.0);
        assert_eq!(change.prior, 100.0);
    }

    #[test]
    fn test_change_flat() {
        let change = compute_change(&series("X", &[100.0, 100.0])).unwrap();
        assert_eq!(change.percent_change, 0.0);
        assert_eq!(change.direction, Direction::Flat);
    }

    #[test]
    fn test_change_uses_last_two_points() {
        let change = compute_change(&series("X", &[50.0, 100.0, 90.0])).unwrap();
        assert_eq!(change.percent_change, (90.0 - 100.0) / 100.0 * 100.0);
        assert_eq!(change.direction, Direction::Down);
    }

    #[test]
    fn test_change_matches_formula() {
        let cases = [(100.0, 101.5), (3.2, 3.1), (70000.0, 68000.0), (1.0, 1.0)];
        for (prior, latest) in cases {
            let change = compute_change(&series("X", &[prior, latest])).unwrap();
            assert_eq!(change.percent_change, (latest - prior) / prior * 100.0);
            assert_eq!(change.direction == Direction::Flat, change.percent_change == 0.0);
        }
    }

    #[test]
    fn test_change_insufficient_data() {
        for closes in [&[][..], &[100.0][..]] {
            let err = compute_change(&series("NOPE", closes)).unwrap_err();
            match err {
                MarketError::DataInsufficiency { symbol, points } => {
                    assert_eq!(symbol, "NOPE");
                    assert_eq!(points, closes.len());
                }
                other => panic!("Expected DataInsufficiency, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_change_zero_prior() {
        let err = compute_change(&series("X", &[0.0, 5.0])).unwrap_err();
        assert!(matches!(err, MarketError::InvalidArithmeticInput(_)));
    }

    #[tokio::test]
    async fn test_domestic_quote_skips_conversion() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history().never();

        let quote = normalizer(mock)
            .build_quote_result("005930.KS", &series("005930.KS", &[70000.0, 68000.0]), false)
            .await
            .unwrap();

        assert!(!quote.is_foreign);
        assert!(quote.conversion.is_none());
        assert_eq!(quote.display_price, 68000.0);
        assert_eq!(quote.direction, Direction::Down);
        assert!((quote.percent_change - (-2.857_142_857_142_857)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_foreign_quote_converts_with_live_rate() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .with(eq("USDKRW=X"), eq(7))
            .times(1)
            .returning(|symbol, _| Ok(PriceSeries::new(symbol, vec![1340.0, 1350.0])));

        let quote = normalizer(mock)
            .build_quote_result("AAPL", &series("AAPL", &[150.0, 153.0]), true)
            .await
            .unwrap();

        assert!(quote.is_foreign);
        assert_eq!(quote.conversion_rate(), Some(1350.0));
        assert_eq!(quote.conversion.map(|r| r.source), Some(RateSource::Live));
        assert_eq!(quote.display_price, 206_550.0);
        assert!((quote.percent_change - 2.0).abs() < 1e-9);
        assert_eq!(quote.latest_price, 153.0);
    }

    #[tokio::test]
    async fn test_conversion_rate_falls_back_on_error() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|_, _| Err(MarketError::ProviderUnavailable("timeout".to_string())));

        let config = MarketConfig::builder().fallback_conversion_rate(1380.0).build().unwrap();
        let normalizer = QuoteNormalizer::new(Arc::new(mock), &config);

        let quote = normalizer
            .build_quote_result("AAPL", &series("AAPL", &[150.0, 153.0]), true)
            .await
            .unwrap();

        let rate = quote.conversion.unwrap();
        assert_eq!(rate.value, 1380.0);
        assert!(rate.is_fallback());
        assert_eq!(quote.display_price, 153.0 * 1380.0);
    }

    #[tokio::test]
    async fn test_conversion_rate_falls_back_on_empty_series() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|symbol, _| Ok(PriceSeries::empty(symbol)));

        let rate = normalizer(mock).fetch_conversion_rate().await;
        assert_eq!(rate.value, crate::config::DEFAULT_FALLBACK_CONVERSION_RATE);
        assert_eq!(rate.source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn test_quote_pipeline() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .with(eq("035720.KQ"), eq(7))
            .times(1)
            .returning(|symbol, _| Ok(PriceSeries::new(symbol, vec![41000.0, 41000.0])));

        let quote = normalizer(mock).quote("035720.KQ").await.unwrap();
        assert_eq!(quote.direction, Direction::Flat);
        assert_eq!(quote.display_price, 41000.0);
    }

    #[tokio::test]
    async fn test_quote_unknown_symbol() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|symbol, _| Ok(PriceSeries::empty(symbol)));

        let err = normalizer(mock).quote("NOPE").await.unwrap_err();
        assert!(matches!(err, MarketError::DataInsufficiency { points: 0, .. }));
    }
}
