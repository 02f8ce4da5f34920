//! Option quote data
//!
//! Market rows of an option chain and their Black-Scholes valuation.

use serde::{Deserialize, Serialize};

use super::greeks::Greeks;
use super::option::OptionContract;

/// Option chain row as observed in the market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// The option contract
    pub contract: OptionContract,
    /// Last traded price
    pub last: f64,
    /// Ask price
    pub ask: Option<f64>,
    /// Implied volatility as a fraction (0.25 = 25%), informational only
    pub implied_vol: f64,
}

impl OptionQuote {
    pub fn new(contract: OptionContract, last: f64, implied_vol: f64) -> Self {
        Self {
            contract,
            last,
            ask: None,
            implied_vol,
        }
    }

    pub fn with_ask(mut self, ask: f64) -> Self {
        self.ask = Some(ask);
        self
    }

    pub fn strike(&self) -> f64 {
        self.contract.strike
    }
}

/// Theoretical value and sensitivities for one contract
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Black-Scholes fair value
    pub price: f64,
    pub greeks: Greeks,
}

/// Market row augmented with its valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub quote: OptionQuote,
    pub result: PricingResult,
    /// (theoretical - last) / last * 100; `None` when the last price is zero
    pub spread_pct: Option<f64>,
}

impl PricedQuote {
    pub fn theoretical_price(&self) -> f64 {
        self.result.price
    }

    pub fn greeks(&self) -> &Greeks {
        &self.result.greeks
    }
}

/// Percentage deviation of the theoretical price from the market price.
///
/// Returns `None` for a non-positive market price.
pub fn option_spread(theoretical: f64, market: f64) -> Option<f64> {
    if market > 0.0 {
        Some((theoretical - market) / market * 100.0)
    } else {
        None
    }
}
