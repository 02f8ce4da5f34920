//! Historical (realized) volatility
//!
//! Log-returns from closing prices and their population standard deviation,
//! annualized with the trading-day count.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{BSError, BSResult, PricePoint, PriceSeries, ReturnPoint, ReturnSeries};

/// Trailing window of daily returns
pub const DEFAULT_WINDOW: usize = 21;

/// Trading days per year
pub const TRADING_DAYS: u32 = 252;

/// Daily log-returns `ln(close[i+1] / close[i])` over the trailing `window`
/// returns, keyed by the later date of each pair.
///
/// Needs at least `window + 1` observations.
pub fn daily_log_returns(series: &PriceSeries, window: usize) -> BSResult<ReturnSeries> {
    if window == 0 {
        return Err(BSError::data("volatility window must be at least 1"));
    }
    let required = window
        .checked_add(1)
        .ok_or_else(|| BSError::data(format!("volatility window {} is too large", window)))?;
    if series.len() < required {
        return Err(BSError::insufficient_history(required, series.len()));
    }

    Ok(log_returns(series.tail(required)))
}

/// Yearly log-returns between consecutive year-end closes.
///
/// Empty unless the series crosses at least two year boundaries.
pub fn yearly_log_returns(series: &PriceSeries) -> ReturnSeries {
    log_returns(&year_end_closes(series))
}

/// Last observation of every year that is followed by a later year
pub fn year_end_closes(series: &PriceSeries) -> Vec<PricePoint> {
    series
        .points()
        .windows(2)
        .filter(|w| w[0].date.year() != w[1].date.year())
        .map(|w| w[0])
        .collect()
}

fn log_returns(points: &[PricePoint]) -> ReturnSeries {
    ReturnSeries::new(
        points
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: (w[1].close / w[0].close).ln(),
            })
            .collect(),
    )
}

/// Standard deviation of returns, no annualization.
///
/// Fails on an empty series (a price history shorter than two closes).
pub fn daily_volatility(returns: &ReturnSeries) -> BSResult<f64> {
    returns
        .std_dev()
        .ok_or_else(|| BSError::insufficient_history(1, returns.len()))
}

/// `√trading_days · stddev(returns)`
pub fn annualized_volatility(returns: &ReturnSeries, trading_days: u32) -> BSResult<f64> {
    Ok(f64::from(trading_days).sqrt() * daily_volatility(returns)?)
}

/// Current price and annualized volatility from a price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalVol {
    /// Most recent close
    pub spot: f64,
    /// Date of the most recent close
    pub as_of: NaiveDate,
    /// Annualized volatility of the trailing daily returns
    pub sigma: f64,
}

/// Spot and annualized volatility over the trailing `window` daily returns
pub fn estimate_from_price_history(
    series: &PriceSeries,
    window: usize,
    trading_days: u32,
) -> BSResult<HistoricalVol> {
    let returns = daily_log_returns(series, window)?;
    let sigma = annualized_volatility(&returns, trading_days)?;

    // daily_log_returns guarantees a non-empty series
    let last = series
        .last()
        .ok_or_else(|| BSError::insufficient_history(window.saturating_add(1), 0))?;

    tracing::debug!(
        "Historical vol as of {}: spot={:.4} sigma={:.4} ({} returns)",
        last.date,
        last.close,
        sigma,
        returns.len()
    );

    Ok(HistoricalVol {
        spot: last.close,
        as_of: last.date,
        sigma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        PriceSeries::from_pairs(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + Duration::days(i as i64), c)),
        )
        .unwrap()
    }

    #[test]
    fn test_daily_returns_use_trailing_window() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = series_from(&closes);

        let returns = daily_log_returns(&series, DEFAULT_WINDOW).unwrap();
        assert_eq!(returns.len(), 21);

        // First return is between the 22nd-from-last and 21st-from-last closes
        let first = returns.points()[0];
        assert!((first.value - (119.0_f64 / 118.0).ln()).abs() < 1e-12);
        assert_eq!(first.date, series.points()[19].date);
        assert_eq!(returns.points()[20].date, series.last().unwrap().date);
    }

    #[test]
    fn test_insufficient_history() {
        let series = series_from(&[100.0; 21]);
        let err = daily_log_returns(&series, DEFAULT_WINDOW).unwrap_err();
        assert!(matches!(
            err,
            BSError::InsufficientHistory {
                required: 22,
                actual: 21
            }
        ));

        assert!(daily_log_returns(&series_from(&[100.0; 22]), DEFAULT_WINDOW).is_ok());
        assert!(daily_log_returns(&series, 0).is_err());
    }

    #[test]
    fn test_oversized_window_is_an_error() {
        let series = series_from(&[100.0, 101.0, 102.0]);
        let err = daily_log_returns(&series, usize::MAX).unwrap_err();
        assert!(matches!(err, BSError::Data(_)));

        let err = estimate_from_price_history(&series, usize::MAX, TRADING_DAYS).unwrap_err();
        assert!(matches!(err, BSError::Data(_)));
    }

    #[test]
    fn test_constant_growth_has_zero_vol() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * (0.01 * i as f64).exp()).collect();
        let returns = daily_log_returns(&series_from(&closes), 21).unwrap();
        assert!(daily_volatility(&returns).unwrap() < 1e-12);
    }

    #[test]
    fn test_alternating_returns() {
        // Returns alternate between +ln(1.1) and -ln(1.1): stddev = ln(1.1)
        let closes: Vec<f64> = (0..23).map(|i| if i % 2 == 0 { 100.0 } else { 110.0 }).collect();
        let returns = daily_log_returns(&series_from(&closes), 22).unwrap();
        let expected = 1.1_f64.ln();

        assert!((daily_volatility(&returns).unwrap() - expected).abs() < 1e-12);
        assert!(
            (annualized_volatility(&returns, TRADING_DAYS).unwrap() - 252.0_f64.sqrt() * expected)
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_annualized_scaling() {
        let samples: [&[f64]; 3] = [&[0.01], &[0.02, -0.01, 0.005], &[-0.03, 0.04, 0.0, 0.011, -0.002]];
        for values in samples {
            let returns = ReturnSeries::from_values(values);
            let daily = daily_volatility(&returns).unwrap();
            let annual = annualized_volatility(&returns, 252).unwrap();
            assert!((annual - 252.0_f64.sqrt() * daily).abs() < 1e-12);
        }

        assert!(daily_volatility(&ReturnSeries::default()).is_err());
        assert!(annualized_volatility(&ReturnSeries::default(), 252).is_err());
    }

    #[test]
    fn test_yearly_returns() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let series = PriceSeries::from_pairs([
            (d(2021, 6, 1), 90.0),
            (d(2021, 12, 31), 100.0),
            (d(2022, 3, 1), 105.0),
            (d(2022, 12, 30), 120.0),
            (d(2023, 7, 3), 110.0),
            (d(2023, 12, 29), 150.0),
            (d(2024, 1, 2), 151.0),
        ])
        .unwrap();

        let closes = year_end_closes(&series);
        assert_eq!(closes.len(), 3);
        assert_eq!(closes[0].date, d(2021, 12, 31));

        let returns = yearly_log_returns(&series);
        assert_eq!(returns.len(), 2);
        assert!((returns.points()[0].value - (120.0_f64 / 100.0).ln()).abs() < 1e-12);
        assert!((returns.points()[1].value - (150.0_f64 / 120.0).ln()).abs() < 1e-12);
        assert_eq!(returns.points()[1].date.year(), 2023);
    }

    #[test]
    fn test_yearly_returns_need_two_boundaries() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let series =
            PriceSeries::from_pairs([(d(2023, 11, 1), 100.0), (d(2024, 2, 1), 110.0)]).unwrap();
        assert!(yearly_log_returns(&series).is_empty());
    }

    #[test]
    fn test_estimate_from_price_history() {
        let closes: Vec<f64> = (0..60).map(|i| 150.0 + (i % 3) as f64).collect();
        let series = series_from(&closes);

        let est = estimate_from_price_history(&series, DEFAULT_WINDOW, TRADING_DAYS).unwrap();
        assert_eq!(est.spot, *closes.last().unwrap());
        assert_eq!(est.as_of, series.last().unwrap().date);

        let returns = daily_log_returns(&series, DEFAULT_WINDOW).unwrap();
        let expected = annualized_volatility(&returns, TRADING_DAYS).unwrap();
        assert_eq!(est.sigma, expected);
        assert!(est.sigma > 0.0);
    }
}
