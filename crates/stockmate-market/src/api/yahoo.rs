//! Yahoo Finance API client
//!
//! Reads the public chart (`v8/finance/chart`) and search (`v1/finance/search`)
//! JSON endpoints. Every call is a single request with the configured timeout;
//! there is no retry and no cache.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::api::provider::{MarketDataProvider, NewsItem, PriceSeries, SymbolMetadata};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    provider_publish_time: Option<i64>,
}

impl ChartEnvelope {
    /// First chart result, `None` when Yahoo reports the symbol as unknown
    fn into_result(self) -> Result<Option<ChartResult>> {
        if let Some(error) = self.chart.error {
            if error.code.eq_ignore_ascii_case("Not Found") {
                return Ok(None);
            }
            return Err(MarketError::ProviderUnavailable(format!(
                "Yahoo Finance error {}: {}",
                error.code,
                error.description.unwrap_or_default()
            )));
        }

        Ok(self.chart.result.and_then(|results| results.into_iter().next()))
    }
}

impl ChartResult {
    /// Non-null, finite closes in provider order (oldest first)
    fn closes(&self) -> Vec<f64> {
        self.indicators
            .as_ref()
            .and_then(|indicators| indicators.quote.first())
            .map(|quote| {
                quote
                    .close
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|close| close.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn metadata(&self) -> SymbolMetadata {
        SymbolMetadata {
            long_name: self.meta.long_name.clone(),
            short_name: self.meta.short_name.clone(),
            currency: self.meta.currency.clone(),
        }
    }
}

impl From<SearchNews> for NewsItem {
    fn from(news: SearchNews) -> Self {
        Self {
            title: news.title.trim().to_string(),
            link: news.link,
            publisher: news.publisher,
            published_at: news
                .provider_publish_time
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| MarketError::ConfigError(format!("Invalid base URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| MarketError::ConfigError("Base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<Option<ChartResult>> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        debug!(symbol, "Fetching chart");

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Yahoo answers unknown symbols with 404 plus a JSON error body
        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(MarketError::ProviderUnavailable(format!(
                    "Yahoo Finance HTTP error {status}"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let result = envelope.into_result()?;
        if result.is_none() && !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::ProviderUnavailable(format!(
                "Yahoo Finance HTTP error {status}"
            )));
        }

        Ok(result)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn price_history(&self, symbol: &str, window_days: u32) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(window_days));

        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", "1d".to_string()),
        ];

        let series = match self.fetch_chart(symbol, &query).await? {
            Some(result) => PriceSeries::new(symbol, result.closes()),
            None => PriceSeries::empty(symbol),
        };

        debug!(symbol, points = series.len(), "Fetched price history");
        Ok(series)
    }

    async fn metadata(&self, symbol: &str) -> Result<Option<SymbolMetadata>> {
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];

        Ok(self
            .fetch_chart(symbol, &query)
            .await?
            .map(|result| result.metadata()))
    }

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let url = self.endpoint(&["v1", "finance", "search"])?;
        debug!(symbol, limit, "Fetching news");

        let response = self
            .client
            .get(url)
            .query(&[
                ("q", symbol.to_string()),
                ("quotesCount", "0".to_string()),
                ("newsCount", limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::ProviderUnavailable(format!(
                "Yahoo Finance HTTP error {}",
                response.status()
            )));
        }

        let search: SearchResponse = response.json().await?;

        Ok(search
            .news
            .into_iter()
            .filter(|news| !news.title.trim().is_empty())
            .take(limit)
            .map(NewsItem::from)
            .collect())
    }
}
