//! Core data types for BS Options
//!
//! Defines fundamental types:
//! - OptionContract: Strike, expiry, type (call/put)
//! - OptionQuote: Last/ask price and implied vol from the chain
//! - PriceSeries / ReturnSeries: Ordered closing prices and log-returns
//! - Greeks, PricingResult: Model output

pub mod option;
pub mod quote;
pub mod series;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use series::*;
pub use greeks::*;
pub use error::*;
