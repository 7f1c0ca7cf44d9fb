//! Tool for a single exchange rate

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use stockmate_tools::{Result as ToolResult, Tool, parse_params};
use tracing::warn;

use super::MarketContext;
use crate::fx::{fetch_rate_quote, pair_base};
use crate::report::Subject;

/// Tool rendering the latest rate of a currency pair
pub struct ExchangeRateTool {
    ctx: MarketContext,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateParams {
    #[serde(default)]
    from_currency: Option<String>,
    #[serde(default)]
    to_currency: Option<String>,
}

impl ExchangeRateTool {
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExchangeRateTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: ExchangeRateParams = parse_params(params)?;
        let config = &self.ctx.config;

        let base = params
            .from_currency
            .unwrap_or_else(|| pair_base(&config.fx_pair).unwrap_or("USD").to_string())
            .trim()
            .to_ascii_uppercase();
        let quote = params
            .to_currency
            .unwrap_or_else(|| config.local_currency.clone())
            .trim()
            .to_ascii_uppercase();

        let text = match fetch_rate_quote(&self.ctx.normalizer, &base, &quote).await {
            Ok(rate) => self.ctx.formatter.format_exchange_rate(&rate),
            Err(e) => {
                warn!(base = %base, quote = %quote, "Exchange rate failed: {e}");
                self.ctx
                    .formatter
                    .format_error(Subject::ExchangeRate { base: &base, quote: &quote }, &e)
            }
        };

        Ok(self.ctx.finish(text))
    }

    fn name(&self) -> &str {
        "get_exchange_rate"
    }

    fn description(&self) -> &str {
        "Latest exchange rate between two currencies with the change from the \
         previous close. Currencies are codes such as USD, JPY, KRW or USDT."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from_currency": {
                    "type": "string",
                    "description": "Base currency code",
                    "default": "USD"
                },
                "to_currency": {
                    "type": "string",
                    "description": "Quote currency code",
                    "default": "KRW"
                }
            }
        })
    }
}
