//! JSON market snapshots
//!
//! A snapshot bundles one underlying's daily closes with its call and put
//! chains so that pricing can run offline. Chain rows accept implied
//! volatility either as a fraction (`0.25`) or as a percent string (`"25.00%"`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{parse_implied_vol, MarketData};
use crate::core::{BSError, BSResult, OptionContract, OptionQuote, OptionType, PriceSeries};

/// Implied volatility as found in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawImpliedVol {
    Fraction(f64),
    Text(String),
}

impl RawImpliedVol {
    pub fn to_fraction(&self) -> BSResult<f64> {
        match self {
            RawImpliedVol::Fraction(v) if v.is_finite() && *v >= 0.0 => Ok(*v),
            RawImpliedVol::Fraction(v) => {
                Err(BSError::data(format!("Invalid implied volatility: {}", v)))
            }
            RawImpliedVol::Text(s) => parse_implied_vol(s),
        }
    }
}

/// One chain row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub contract: String,
    pub strike: f64,
    pub last: f64,
    #[serde(default)]
    pub ask: Option<f64>,
    pub implied_vol: RawImpliedVol,
}

/// Offline market data for one underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ticker: String,
    pub history: PriceSeries,
    #[serde(default)]
    pub calls: Vec<SnapshotRow>,
    #[serde(default)]
    pub puts: Vec<SnapshotRow>,
}

impl Snapshot {
    pub fn from_file(path: impl AsRef<Path>) -> BSResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;

        tracing::info!(
            "Loaded {} snapshot from {:?}: {} closes, {} calls, {} puts",
            snapshot.ticker,
            path,
            snapshot.history.len(),
            snapshot.calls.len(),
            snapshot.puts.len()
        );
        Ok(snapshot)
    }

    fn check_ticker(&self, ticker: &str) -> BSResult<()> {
        if self.ticker.eq_ignore_ascii_case(ticker) {
            Ok(())
        } else {
            Err(BSError::data(format!(
                "Snapshot holds {}, not {}",
                self.ticker, ticker
            )))
        }
    }
}

impl MarketData for Snapshot {
    fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> BSResult<PriceSeries> {
        self.check_ticker(ticker)?;
        Ok(self.history.between(start, end))
    }

    /// Rows are stamped with the requested expiry.
    fn option_chain(
        &self,
        ticker: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Vec<OptionQuote>> {
        self.check_ticker(ticker)?;

        let rows = match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        };

        rows.iter()
            .map(|row| {
                let contract = OptionContract::new(
                    self.ticker.clone(),
                    row.contract.clone(),
                    row.strike,
                    expiry,
                    option_type,
                );
                let mut quote = OptionQuote::new(contract, row.last, row.implied_vol.to_fraction()?);
                quote.ask = row.ask;
                Ok(quote)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "ticker": "AAPL",
        "history": [
            { "date": "2024-10-01", "close": 226.21 },
            { "date": "2024-10-02", "close": 226.78 },
            { "date": "2024-10-03", "close": 225.67 }
        ],
        "calls": [
            { "contract": "AAPL241220C00220000", "strike": 220.0, "last": 12.1, "ask": 12.3, "implied_vol": "27.50%" },
            { "contract": "AAPL241220C00230000", "strike": 230.0, "last": 6.2, "implied_vol": 0.251 }
        ]
    }"#;

    fn load() -> Snapshot {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        Snapshot::from_file(file.path()).unwrap()
    }

    #[test]
    fn test_load_and_chain() {
        let snapshot = load();
        let expiry = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();

        let calls = snapshot.option_chain("aapl", OptionType::Call, expiry).unwrap();
        assert_eq!(calls.len(), 2);
        assert!((calls[0].implied_vol - 0.275).abs() < 1e-12);
        assert_eq!(calls[0].ask, Some(12.3));
        assert_eq!(calls[1].implied_vol, 0.251);
        assert_eq!(calls[1].contract.expiry, expiry);

        assert!(snapshot.option_chain("AAPL", OptionType::Put, expiry).unwrap().is_empty());
        assert!(matches!(
            snapshot.option_chain("MSFT", OptionType::Call, expiry),
            Err(BSError::Data(_))
        ));
    }

    #[test]
    fn test_history_range() {
        let snapshot = load();
        let d = |day| NaiveDate::from_ymd_opt(2024, 10, day).unwrap();

        let history = snapshot.price_history("AAPL", d(2), d(30)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest_close(), Some(225.67));
    }

    #[test]
    fn test_bad_implied_vol() {
        let raw = RawImpliedVol::Text("n/a".into());
        assert!(raw.to_fraction().is_err());
        assert!(RawImpliedVol::Fraction(-0.1).to_fraction().is_err());
    }

    #[test]
    fn test_unordered_history_rejected() {
        let json = r#"{ "ticker": "X", "history": [
            { "date": "2024-10-02", "close": 1.0 }, { "date": "2024-10-01", "close": 1.0 } ] }"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }
}
