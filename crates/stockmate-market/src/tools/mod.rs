//! Market tools exposed to tool-calling clients

pub mod currency_briefing;
pub mod exchange_rate;
pub mod investment_card;
pub mod stock_news;
pub mod stock_report;

pub use currency_briefing::CurrencyBriefingTool;
pub use exchange_rate::ExchangeRateTool;
pub use investment_card::InvestmentCardTool;
pub use stock_news::StockNewsTool;
pub use stock_report::StockReportTool;

use std::sync::Arc;
use stockmate_tools::ToolRegistry;

use crate::api::MarketDataProvider;
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::quote::QuoteNormalizer;
use crate::report::{ChatFormatter, ReportFormatter, fit_response};

/// Dependencies shared by every market tool
#[derive(Clone)]
pub struct MarketContext {
    pub normalizer: Arc<QuoteNormalizer>,
    pub formatter: Arc<dyn ReportFormatter>,
    pub config: Arc<MarketConfig>,
}

impl MarketContext {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: Arc<MarketConfig>) -> Self {
        Self {
            normalizer: Arc::new(QuoteNormalizer::new(provider, &config)),
            formatter: Arc::new(ChatFormatter::new(&config)),
            config,
        }
    }

    /// Apply the response size cap
    fn finish(&self, text: String) -> String {
        fit_response(text, self.config.max_response_bytes)
    }
}

/// Register every market tool, in the order clients list them
pub fn register_market_tools(
    registry: &mut ToolRegistry,
    provider: Arc<dyn MarketDataProvider>,
    config: Arc<MarketConfig>,
) -> stockmate_tools::Result<()> {
    let ctx = MarketContext::new(provider, config);

    registry.register(Arc::new(StockReportTool::new(ctx.clone())))?;
    registry.register(Arc::new(ExchangeRateTool::new(ctx.clone())))?;
    registry.register(Arc::new(StockNewsTool::new(ctx.clone())))?;
    registry.register(Arc::new(InvestmentCardTool::new(ctx.clone())))?;
    registry.register(Arc::new(CurrencyBriefingTool::new(ctx)))?;

    Ok(())
}

/// Trim and uppercase a ticker, rejecting blanks and embedded whitespace
pub(crate) fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(MarketError::InvalidInput("symbol must not be empty".to_string()));
    }
    if symbol.chars().any(char::is_whitespace) || symbol.len() > 32 {
        return Err(MarketError::InvalidInput(format!("'{symbol}' is not a valid symbol")));
    }
    Ok(symbol.to_ascii_uppercase())
}
