//! Tool for a multi-currency rate briefing

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use stockmate_tools::{Result as ToolResult, Tool, parse_params};
use tracing::warn;

use super::MarketContext;
use crate::error::{MarketError, Result};
use crate::fx::fetch_rate_quote;
use crate::report::{BriefingLine, Subject};

/// Most currencies accepted in one briefing
pub const MAX_BRIEFING_CURRENCIES: usize = 8;

/// Tool rendering rates of several currencies against the local one
pub struct CurrencyBriefingTool {
    ctx: MarketContext,
}

#[derive(Debug, Deserialize)]
struct BriefingParams {
    #[serde(default = "default_currencies")]
    currencies: Vec<String>,
}

fn default_currencies() -> Vec<String> {
    ["USD", "EUR", "JPY", "CNY"].map(String::from).to_vec()
}

impl CurrencyBriefingTool {
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx }
    }

    async fn briefing(&self, currencies: &[String]) -> Result<String> {
        if currencies.is_empty() || currencies.len() > MAX_BRIEFING_CURRENCIES {
            return Err(MarketError::InvalidInput(format!(
                "between 1 and {MAX_BRIEFING_CURRENCIES} currencies can be briefed"
            )));
        }

        let local = &self.ctx.config.local_currency;
        let mut lines = Vec::with_capacity(currencies.len());

        for raw in currencies {
            let currency = raw.trim().to_ascii_uppercase();
            let rate = match fetch_rate_quote(&self.ctx.normalizer, &currency, local).await {
                Ok(rate) => Some(rate),
                Err(e) => {
                    warn!(currency = %currency, "Briefing pair unavailable: {e}");
                    None
                }
            };
            lines.push(BriefingLine { currency, rate });
        }

        Ok(self.ctx.formatter.format_briefing(&lines))
    }
}

#[async_trait]
impl Tool for CurrencyBriefingTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: BriefingParams = parse_params(params)?;

        let text = match self.briefing(&params.currencies).await {
            Ok(text) => text,
            Err(e) => self.ctx.formatter.format_error(Subject::Briefing, &e),
        };

        Ok(self.ctx.finish(text))
    }

    fn name(&self) -> &str {
        "get_currency_briefing"
    }

    fn description(&self) -> &str {
        "Briefing of major exchange rates against the won with their daily change. \
         Defaults to USD, EUR, JPY and CNY."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "currencies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Currency codes to include",
                    "default": ["USD", "EUR", "JPY", "CNY"],
                    "maxItems": MAX_BRIEFING_CURRENCIES
                }
            }
        })
    }
}
