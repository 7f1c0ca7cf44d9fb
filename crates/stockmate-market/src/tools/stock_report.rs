//! Tool for the current quote of a single symbol

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use stockmate_tools::{Result as ToolResult, Tool, parse_params};
use tracing::warn;

use super::{MarketContext, normalize_symbol};
use crate::api::display_name;
use crate::error::Result;
use crate::quote::classify;
use crate::report::Subject;

/// Tool rendering a price report for one symbol
pub struct StockReportTool {
    ctx: MarketContext,
}

#[derive(Debug, Deserialize)]
struct StockReportParams {
    symbol: String,
}

impl StockReportTool {
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx }
    }

    async fn report(&self, symbol: &str) -> Result<String> {
        let normalizer = &self.ctx.normalizer;

        let series = normalizer.fetch_series(symbol).await?;
        let quote = normalizer
            .build_quote_result(symbol, &series, classify(symbol))
            .await?;
        let metadata = normalizer.provider().metadata(symbol).await?;

        let name = display_name(metadata.as_ref(), symbol);
        let currency = metadata.as_ref().and_then(|m| m.currency.as_deref());
        Ok(self.ctx.formatter.format_quote(&quote, &name, currency))
    }
}

#[async_trait]
impl Tool for StockReportTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: StockReportParams = parse_params(params)?;

        let text = match normalize_symbol(&params.symbol) {
            Ok(symbol) => match self.report(&symbol).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(symbol = %symbol, "Stock report failed: {e}");
                    self.ctx.formatter.format_error(Subject::Quote(&symbol), &e)
                }
            },
            Err(e) => self.ctx.formatter.format_error(Subject::Quote(&params.symbol), &e),
        };

        Ok(self.ctx.finish(text))
    }

    fn name(&self) -> &str {
        "get_stock_report"
    }

    fn description(&self) -> &str {
        "Current price and daily change of a stock. Korean stocks take a .KS (KOSPI) \
         or .KQ (KOSDAQ) suffix, e.g. 005930.KS; foreign stocks such as AAPL are \
         also shown converted to won."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. AAPL or 005930.KS"
                }
            },
            "required": ["symbol"]
        })
    }
}
