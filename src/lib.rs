//! # BS Options - Black-Scholes Pricing for Listed Equity Options
//!
//! Prices exchange-traded stock options with the Black-Scholes-Merton
//! closed-form model and compares the result with the last traded price.
//!
//! ## Overview
//!
//! Inputs flow one way:
//! - **Price history** → historical (realized) volatility σ and spot S
//! - **Reference date + interval** → expiration (a Friday) and τ
//! - **S, σ, τ, strikes, rate** → price, Greeks and spread against market
//!
//! ## Key Components
//!
//! - **Black-Scholes**: Φ/φ, d1/d2, call/put price, five Greeks per type
//! - **Volatility**: daily/yearly log-returns, annualized standard deviation
//! - **Expiry**: calendar offset rolled to the next Friday
//! - **Chain pricing**: values every row of an option chain
//! - **Data**: Yahoo Finance, JSON snapshots, local cache
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bs_options::prelude::*;
//! use chrono::NaiveDate;
//!
//! let yahoo = YahooClient::new().unwrap();
//! let today = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
//!
//! let chain = price_option_chain(
//!     &yahoo,
//!     "AAPL",
//!     OptionType::Call,
//!     Interval::Month,
//!     today,
//!     &PricingConfig::default(),
//! )
//! .unwrap();
//!
//! for row in &chain.rows {
//!     println!("{} {:.2} {:?}", row.quote.contract.symbol, row.theoretical_price(), row.spread_pct);
//! }
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - Solve for implied volatility (market IV is carried through as data)
//! - Price with binomial, Monte Carlo or stochastic volatility models
//! - Aggregate risk across a portfolio

pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        option_spread, BSError, BSResult, Greeks, OptionContract, OptionQuote, OptionType,
        PricePoint, PriceSeries, PricedQuote, PricingResult, ReturnSeries,
    };

    // Configuration
    pub use crate::config::PricingConfig;

    // Data fetching
    pub use crate::data::{
        CacheConfig, CachedFetcher, DataCache, MarketData, Snapshot, YahooClient,
    };

    // Models
    pub use crate::models::{
        annualized_volatility,
        call_price,
        compute_expiration,
        daily_log_returns,
        daily_volatility,
        estimate_from_price_history,
        greeks as bs_greeks,
        norm_cdf,
        norm_pdf,
        put_price,
        yearly_log_returns,
        Expiration,
        HistoricalVol,
        Interval,
        PricingInputs,
        Strikes,
    };

    // Chain pricing
    pub use crate::pricing::{price_chain, price_option_chain, PricedChain};
}

// Re-export main types at crate root
pub use crate::core::{BSError, BSResult};
pub use crate::config::PricingConfig;
pub use crate::pricing::{price_option_chain, PricedChain};
