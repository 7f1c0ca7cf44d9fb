//! Exchange-rate lookups for currency pairs

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::quote::{PriceChange, QuoteNormalizer, compute_change};

/// Latest rate for a pair, with the day change when available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub base: String,
    pub quote: String,
    /// Units of `quote` per one unit of `base`
    pub rate: f64,
    pub change: Option<PriceChange>,
}

/// Provider symbol for a currency pair, e.g. `USDKRW=X`
pub fn pair_symbol(base: &str, quote: &str) -> String {
    format!("{base}{quote}=X")
}

/// Base currency of a pair symbol such as `USDKRW=X`
pub fn pair_base(pair: &str) -> Option<&str> {
    pair.get(..3).filter(|code| code.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Trim and uppercase a currency code
///
/// ISO codes are 3 letters; the provider also quotes longer tickers such as
/// `USDT`, so 3 to 5 ASCII letters or digits are accepted.
pub fn normalize_currency_code(code: &str) -> Result<String> {
    let code = code.trim();
    if !(3..=5).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MarketError::InvalidInput(format!(
            "'{code}' is not a 3 to 5 character currency code"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

/// Fetch the latest rate of `base` in `quote`
pub async fn fetch_rate_quote(
    normalizer: &QuoteNormalizer,
    base: &str,
    quote: &str,
) -> Result<RateQuote> {
    let base = normalize_currency_code(base)?;
    let quote = normalize_currency_code(quote)?;

    if base == quote {
        return Err(MarketError::InvalidInput(format!(
            "cannot quote {base} against itself"
        )));
    }

    let symbol = pair_symbol(&base, &quote);
    let series = normalizer.fetch_series(&symbol).await?;

    let rate = series
        .latest()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| MarketError::DataInsufficiency {
            symbol: symbol.clone(),
            points: series.len(),
        })?;

    Ok(RateQuote {
        base,
        quote,
        rate,
        change: compute_change(&series).ok(),
    })
}
