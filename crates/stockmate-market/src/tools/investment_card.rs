//! Tool for a position's profit and return

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use stockmate_tools::{Result as ToolResult, Tool, parse_params};
use tracing::{debug, warn};

use super::MarketContext;
use crate::error::{MarketError, Result};
use crate::fx::{fetch_rate_quote, normalize_currency_code, pair_base};
use crate::investment::{Position, analyze, validate};
use crate::quote::{ConversionRate, RateSource};
use crate::report::Subject;

/// Tool rendering a profit/loss card for a position
pub struct InvestmentCardTool {
    ctx: MarketContext,
}

#[derive(Debug, Deserialize)]
struct InvestmentParams {
    current_price: f64,
    buy_price: f64,
    #[serde(default = "default_quantity")]
    quantity: i64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_rate: Option<f64>,
}

fn default_quantity() -> i64 {
    1
}

impl InvestmentCardTool {
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx }
    }

    async fn card(&self, params: InvestmentParams) -> Result<String> {
        let local = &self.ctx.config.local_currency;

        let currency = match params.currency.as_deref() {
            Some(code) => normalize_currency_code(code)?,
            None => local.clone(),
        };

        let quantity = u64::try_from(params.quantity)
            .map_err(|_| MarketError::InvalidInput("quantity must be at least 1".to_string()))?;

        let position = Position {
            buy_price: params.buy_price,
            current_price: params.current_price,
            quantity,
            currency,
        };
        validate(&position)?;

        let conversion = if position.currency == *local {
            None
        } else {
            Some(self.conversion_rate(&position.currency, params.exchange_rate).await?)
        };

        let analysis = analyze(&position, conversion)?;
        Ok(self.ctx.formatter.format_investment(&analysis))
    }

    /// Caller's rate when usable, otherwise the day's rate for the currency
    async fn conversion_rate(&self, currency: &str, provided: Option<f64>) -> Result<ConversionRate> {
        if let Some(value) = provided.filter(|rate| rate.is_finite() && *rate > 0.0) {
            return Ok(ConversionRate {
                value,
                source: RateSource::Provided,
            });
        }

        let normalizer = &self.ctx.normalizer;
        if pair_base(&self.ctx.config.fx_pair) == Some(currency) {
            return Ok(normalizer.fetch_conversion_rate().await);
        }

        debug!(currency, "Fetching rate outside the reference pair");
        let quote = fetch_rate_quote(normalizer, currency, &self.ctx.config.local_currency).await?;
        Ok(ConversionRate {
            value: quote.rate,
            source: RateSource::Live,
        })
    }
}

#[async_trait]
impl Tool for InvestmentCardTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: InvestmentParams = parse_params(params)?;

        let text = match self.card(params).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Investment analysis failed: {e}");
                self.ctx.formatter.format_error(Subject::Investment, &e)
            }
        };

        Ok(self.ctx.finish(text))
    }

    fn name(&self) -> &str {
        "analyze_investment_card"
    }

    fn description(&self) -> &str {
        "Profit, loss and return of a holding from its buy price, current price and \
         quantity. Positions in a foreign currency are also converted to won."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "current_price": {
                    "type": "number",
                    "description": "Current price per share"
                },
                "buy_price": {
                    "type": "number",
                    "description": "Average buy price per share"
                },
                "quantity": {
                    "type": "integer",
                    "description": "Number of shares held",
                    "default": 1,
                    "minimum": 1
                },
                "currency": {
                    "type": "string",
                    "description": "Currency the prices are quoted in (default KRW)"
                },
                "exchange_rate": {
                    "type": "number",
                    "description": "Won per unit of the position's currency; fetched when omitted"
                }
            },
            "required": ["current_price", "buy_price"]
        })
    }
}
