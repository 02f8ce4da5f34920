//! Option chain valuation
//!
//! Prices every row of a chain against one (spot, σ, τ, r) tuple and measures
//! how far the model sits from the last traded price.

use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::core::{option_spread, BSError, BSResult, OptionQuote, OptionType, PricedQuote};
use crate::data::MarketData;
use crate::models::{
    compute_expiration, estimate_from_price_history, Expiration, Interval, PricingInputs,
};

/// A fully priced chain for one underlying and expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedChain {
    pub ticker: String,
    pub option_type: OptionType,
    /// Reference date the expiration was computed from
    pub reference_date: NaiveDate,
    /// Spot used for pricing (latest close)
    pub spot: f64,
    /// Annualized historical volatility used for pricing
    pub sigma: f64,
    pub risk_free_rate: f64,
    pub expiration: Expiration,
    /// One row per input quote, in input order
    pub rows: Vec<PricedQuote>,
}

impl PricedChain {
    /// Row with the strike closest to spot
    pub fn atm_row(&self) -> Option<&PricedQuote> {
        self.rows.iter().min_by(|a, b| {
            let da = (a.quote.strike() - self.spot).abs();
            let db = (b.quote.strike() - self.spot).abs();
            da.total_cmp(&db)
        })
    }
}

/// Price and Greeks for each quote (by its own option type) plus the spread
/// against its last price. Output order matches `quotes`.
///
/// Inputs that pass validation but overflow the closed form (for example a
/// gamma denominator that underflows to zero) are rejected as degenerate.
pub fn price_chain(
    spot: f64,
    sigma: f64,
    rate: f64,
    expiration: &Expiration,
    quotes: &[OptionQuote],
) -> BSResult<Vec<PricedQuote>> {
    quotes
        .par_iter()
        .map(|quote| {
            let inputs = PricingInputs::new(spot, quote.strike(), rate, expiration.tau, sigma)?;
            let result = inputs.result(quote.contract.option_type);
            if !(result.price.is_finite() && result.greeks.is_finite()) {
                return Err(BSError::degenerate(format!(
                    "non-finite price or greeks for {}",
                    quote.contract.symbol
                )));
            }

            Ok(PricedQuote {
                quote: quote.clone(),
                result,
                spread_pct: option_spread(result.price, quote.last),
            })
        })
        .collect()
}

/// Price the `option_type` chain of `ticker` expiring `interval` after
/// `reference_date`.
///
/// Price history and chain rows come from `market`; everything else is
/// computed here. Errors from the data source propagate unchanged.
pub fn price_option_chain<M: MarketData + ?Sized>(
    market: &M,
    ticker: &str,
    option_type: OptionType,
    interval: Interval,
    reference_date: NaiveDate,
    config: &PricingConfig,
) -> BSResult<PricedChain> {
    config.validate()?;

    let start = config
        .history_lookback_years
        .checked_mul(12)
        .and_then(|months| reference_date.checked_sub_months(Months::new(months)))
        .ok_or_else(|| {
            BSError::data(format!(
                "history_lookback_years {} reaches before the earliest date",
                config.history_lookback_years
            ))
        })?;

    let history = market.price_history(ticker, start, reference_date)?;
    let hist_vol =
        estimate_from_price_history(&history, config.volatility_window, config.trading_days)?;

    let expiration = compute_expiration(reference_date, interval)?;
    tracing::debug!(
        "{} {} expiration: {} ({} days, tau={:.4})",
        ticker,
        interval,
        expiration.date,
        expiration.days,
        expiration.tau
    );

    let quotes: Vec<OptionQuote> = market
        .option_chain(ticker, option_type, expiration.date)?
        .into_iter()
        .filter(|q| {
            let keep = q.contract.option_type == option_type;
            if !keep {
                tracing::warn!(
                    "Skipping {} row {} in {} chain",
                    q.contract.option_type,
                    q.contract.symbol,
                    option_type
                );
            }
            keep
        })
        .collect();

    let rows = price_chain(
        hist_vol.spot,
        hist_vol.sigma,
        config.risk_free_rate,
        &expiration,
        &quotes,
    )?;

    tracing::info!(
        "Priced {} {} {} contracts expiring {} (spot={:.2}, sigma={:.4})",
        rows.len(),
        ticker,
        option_type,
        expiration.date,
        hist_vol.spot,
        hist_vol.sigma
    );

    Ok(PricedChain {
        ticker: ticker.to_string(),
        option_type,
        reference_date,
        spot: hist_vol.spot,
        sigma: hist_vol.sigma,
        risk_free_rate: config.risk_free_rate,
        expiration,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, PriceSeries};
    use crate::models::{call_price, greeks, put_price};

    fn expiration() -> Expiration {
        Expiration {
            date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            days: 30,
            tau: 30.0 / 365.0,
        }
    }

    fn quote(strike: f64, last: f64, option_type: OptionType) -> OptionQuote {
        let flag = match option_type {
            OptionType::Call => "C",
            OptionType::Put => "P",
        };
        let contract = OptionContract::new(
            "AAPL",
            format!("AAPL241220{}{:08}", flag, (strike * 1000.0) as u64),
            strike,
            expiration().date,
            option_type,
        );
        OptionQuote::new(contract, last, 0.3)
    }

    #[test]
    fn test_price_chain_rows() {
        let quotes = vec![
            quote(140.0, 12.0, OptionType::Call),
            quote(150.0, 4.0, OptionType::Call),
            quote(160.0, 0.0, OptionType::Call),
        ];
        let rows = price_chain(150.0, 0.25, 0.04, &expiration(), &quotes).unwrap();
        assert_eq!(rows.len(), 3);

        for (row, q) in rows.iter().zip(&quotes) {
            assert_eq!(row.quote, *q);
            let expected = call_price(150.0, q.strike(), 0.04, 30.0 / 365.0, 0.25);
            assert!((row.theoretical_price() - expected).abs() < 1e-12);
            let g = greeks(150.0, q.strike(), 0.04, 30.0 / 365.0, 0.25, OptionType::Call).unwrap();
            assert_eq!(*row.greeks(), g);
        }

        let atm = &rows[1];
        let spread = atm.spread_pct.unwrap();
        assert!((spread - (atm.theoretical_price() - 4.0) / 4.0 * 100.0).abs() < 1e-12);
        assert_eq!(rows[2].spread_pct, None);
    }

    #[test]
    fn test_price_chain_uses_row_type() {
        let quotes = vec![quote(150.0, 4.0, OptionType::Put)];
        let rows = price_chain(150.0, 0.25, 0.04, &expiration(), &quotes).unwrap();
        let expected = put_price(150.0, 150.0, 0.04, 30.0 / 365.0, 0.25);
        assert!((rows[0].theoretical_price() - expected).abs() < 1e-12);
        assert!(rows[0].greeks().delta < 0.0);
    }

    #[test]
    fn test_price_chain_rejects_degenerate() {
        let quotes = vec![quote(150.0, 4.0, OptionType::Call)];
        let err = price_chain(150.0, 0.0, 0.04, &expiration(), &quotes).unwrap_err();
        assert!(matches!(err, BSError::DegenerateInput(_)));

        let bad = vec![quote(0.0, 1.0, OptionType::Call)];
        assert!(price_chain(150.0, 0.25, 0.04, &expiration(), &bad).is_err());
    }

    #[test]
    fn test_price_chain_rejects_non_finite_greeks() {
        // S·σ·√τ underflows to zero, so gamma is infinite
        let short = Expiration {
            tau: 1e-20,
            ..expiration()
        };
        let quotes = vec![quote(1e-100, 0.0, OptionType::Call)];
        let err = price_chain(1e-100, 1e-300, 0.0, &short, &quotes).unwrap_err();
        assert!(matches!(err, BSError::DegenerateInput(_)));
    }

    struct NoMarket;

    impl MarketData for NoMarket {
        fn price_history(&self, _: &str, _: NaiveDate, _: NaiveDate) -> BSResult<PriceSeries> {
            Err(BSError::data("no history"))
        }

        fn option_chain(
            &self,
            _: &str,
            _: OptionType,
            _: NaiveDate,
        ) -> BSResult<Vec<OptionQuote>> {
            Err(BSError::data("no chain"))
        }
    }

    #[test]
    fn test_huge_lookback_is_an_error() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
        for years in [400_000_000, u32::MAX] {
            let config = PricingConfig {
                history_lookback_years: years,
                ..PricingConfig::default()
            };
            let err = price_option_chain(
                &NoMarket,
                "AAPL",
                OptionType::Call,
                Interval::Month,
                date,
                &config,
            )
            .unwrap_err();
            assert!(matches!(err, BSError::Data(ref msg) if msg.contains("history_lookback_years")));
        }
    }
}
