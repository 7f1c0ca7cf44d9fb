//! Profit/loss analysis for a position

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::quote::ConversionRate;

/// Whether a position is up, down or even
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Profit,
    Loss,
    BreakEven,
}

/// A position to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub buy_price: f64,
    pub current_price: f64,
    pub quantity: u64,
    /// ISO code the prices are quoted in
    pub currency: String,
}

/// Result of evaluating a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAnalysis {
    pub buy_price: f64,
    pub current_price: f64,
    pub quantity: u64,
    pub currency: String,
    /// `(current - buy) * quantity` in the position's currency
    pub profit: f64,
    /// `(current - buy) / buy * 100`
    pub roi_percent: f64,
    pub outcome: Outcome,
    /// Rate used for the local-currency figures, for foreign positions only
    pub conversion: Option<ConversionRate>,
    pub local_profit: Option<f64>,
    pub local_value: Option<f64>,
}

impl InvestmentAnalysis {
    pub fn is_foreign(&self) -> bool {
        self.conversion.is_some()
    }
}

/// Evaluate a position
///
/// `conversion` must be given for positions held in a foreign currency; the
/// local-currency figures are derived from it.
pub fn analyze(position: &Position, conversion: Option<ConversionRate>) -> Result<InvestmentAnalysis> {
    validate(position)?;

    let per_share = position.current_price - position.buy_price;
    let profit = per_share * position.quantity as f64;
    let roi_percent = per_share / position.buy_price * 100.0;

    if !profit.is_finite() || !roi_percent.is_finite() {
        return Err(MarketError::InvalidArithmeticInput(
            "profit could not be computed for these prices".to_string(),
        ));
    }

    let outcome = if roi_percent > 0.0 {
        Outcome::Profit
    } else if roi_percent < 0.0 {
        Outcome::Loss
    } else {
        Outcome::BreakEven
    };

    Ok(InvestmentAnalysis {
        buy_price: position.buy_price,
        current_price: position.current_price,
        quantity: position.quantity,
        currency: position.currency.clone(),
        profit,
        roi_percent,
        outcome,
        conversion,
        local_profit: conversion.map(|rate| rate.convert(profit)),
        local_value: conversion
            .map(|rate| rate.convert(position.current_price * position.quantity as f64)),
    })
}

/// Reject positions whose figures cannot be evaluated
pub fn validate(position: &Position) -> Result<()> {
    if !position.buy_price.is_finite() || !position.current_price.is_finite() {
        return Err(MarketError::InvalidInput("prices must be finite numbers".to_string()));
    }

    if position.buy_price == 0.0 {
        return Err(MarketError::InvalidArithmeticInput(
            "buy price is zero, so the return cannot be computed".to_string(),
        ));
    }

    if position.buy_price < 0.0 || position.current_price < 0.0 {
        return Err(MarketError::InvalidInput("prices must not be negative".to_string()));
    }

    if position.quantity == 0 {
        return Err(MarketError::InvalidInput("quantity must be at least 1".to_string()));
    }

    Ok(())
}
