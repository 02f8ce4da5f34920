//! Chain pricing
//!
//! Wires spot, historical volatility and time to maturity into the
//! Black-Scholes formulas for every contract of an option chain.

pub mod chain;

pub use chain::*;
