//! Tool for recent headlines about a symbol

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use stockmate_tools::{Result as ToolResult, Tool, parse_params};
use tracing::warn;

use super::{MarketContext, normalize_symbol};
use crate::error::Result;
use crate::report::Subject;

/// Tool listing the latest news for a symbol
pub struct StockNewsTool {
    ctx: MarketContext,
}

#[derive(Debug, Deserialize)]
struct StockNewsParams {
    symbol: String,
}

impl StockNewsTool {
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx }
    }

    async fn headlines(&self, symbol: &str) -> Result<String> {
        let limit = self.ctx.config.news_limit;
        let mut items = self.ctx.normalizer.provider().news(symbol, limit).await?;
        items.truncate(limit);

        Ok(self.ctx.formatter.format_news(symbol, &items))
    }
}

#[async_trait]
impl Tool for StockNewsTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: StockNewsParams = parse_params(params)?;

        let text = match normalize_symbol(&params.symbol) {
            Ok(symbol) => match self.headlines(&symbol).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(symbol = %symbol, "News lookup failed: {e}");
                    self.ctx.formatter.format_error(Subject::News(&symbol), &e)
                }
            },
            Err(e) => self.ctx.formatter.format_error(Subject::News(&params.symbol), &e),
        };

        Ok(self.ctx.finish(text))
    }

    fn name(&self) -> &str {
        "get_stock_news"
    }

    fn description(&self) -> &str {
        "Up to three of the latest news headlines for a stock, with publisher and link."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. TSLA or 005930.KS"
                }
            },
            "required": ["symbol"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataProvider, NewsItem};
    use crate::error::MarketError;
    use crate::tools::test_support::context;
    use mockall::predicate::eq;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            publisher: Some("Reuters".to_string()),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_news_capped_at_limit() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_news()
            .with(eq("TSLA"), eq(3))
            .times(1)
            .returning(|_, _| Ok(vec![item("a"), item("b"), item("c"), item("d")]));

        let tool = StockNewsTool::new(context(mock));
        let text = tool.execute(json!({ "symbol": "tsla" })).await.unwrap();

        assert!(text.contains("3. c"));
        assert!(!text.contains("4. d"));
    }

    #[tokio::test]
    async fn test_no_news() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_news().returning(|_, _| Ok(Vec::new()));

        let tool = StockNewsTool::new(context(mock));
        let text = tool.execute(json!({ "symbol": "XYZ" })).await.unwrap();

        assert_eq!(text, "📰 'XYZ' 관련 최신 뉴스가 없습니다.");
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_news()
            .returning(|_, _| Err(MarketError::ProviderUnavailable("HTTP 503".to_string())));

        let tool = StockNewsTool::new(context(mock));
        let text = tool.execute(json!({ "symbol": "AAPL" })).await.unwrap();

        assert!(text.starts_with("⚠️ 뉴스 조회 중 오류 발생"));
    }
}
