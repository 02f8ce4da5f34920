//! Data fetching and storage
//!
//! Handles:
//! - Yahoo Finance API for daily closes and option chains (free)
//! - JSON snapshots for offline runs
//! - Local caching

pub mod yahoo;
pub mod snapshot;
pub mod cache;

pub use yahoo::*;
pub use snapshot::*;
pub use cache::*;

use chrono::NaiveDate;

use crate::core::{BSError, BSResult, OptionQuote, OptionType, PriceSeries};

/// Source of price history and option chains
pub trait MarketData {
    /// Daily closes with dates in `[start, end]`
    fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> BSResult<PriceSeries>;

    /// Chain rows of one type for a single expiry
    fn option_chain(
        &self,
        ticker: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Vec<OptionQuote>>;
}

/// Parse an implied volatility such as `"25.00%"` into a fraction (0.25).
///
/// Strings without a percent sign are taken as fractions already.
pub fn parse_implied_vol(raw: &str) -> BSResult<f64> {
    let trimmed = raw.trim();
    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(pct) => (pct.trim(), 100.0),
        None => (trimmed, 1.0),
    };

    let value: f64 = number
        .replace(',', "")
        .parse()
        .map_err(|_| BSError::data(format!("Invalid implied volatility: {:?}", raw)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(BSError::data(format!("Invalid implied volatility: {:?}", raw)));
    }

    Ok(value / scale)
}
