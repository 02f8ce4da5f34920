//! Configuration for chain pricing

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{BSError, BSResult};
use crate::models::{DEFAULT_WINDOW, TRADING_DAYS};

/// Pricing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Annual risk-free rate
    /// Default: 0.04 (rough Treasury bill yield)
    pub risk_free_rate: f64,

    /// Number of trailing daily returns used for volatility
    /// Default: 21 (one trading month)
    pub volatility_window: usize,

    /// Trading days per year used to annualize volatility
    /// Default: 252
    pub trading_days: u32,

    /// Years of daily history requested from the data source
    /// Default: 1
    pub history_lookback_years: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            volatility_window: DEFAULT_WINDOW,
            trading_days: TRADING_DAYS,
            history_lookback_years: 1,
        }
    }
}

impl PricingConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> BSResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: PricingConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn validate(&self) -> BSResult<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(BSError::data("risk_free_rate must be finite"));
        }
        if self.volatility_window == 0 {
            return Err(BSError::data("volatility_window must be at least 1"));
        }
        if self.trading_days == 0 {
            return Err(BSError::data("trading_days must be at least 1"));
        }
        if self.history_lookback_years == 0 {
            return Err(BSError::data("history_lookback_years must be at least 1"));
        }
        Ok(())
    }
}
