//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (pricing and Greeks)
//! - Historical volatility estimator
//! - Expiration / time-to-maturity calculator

pub mod black_scholes;
pub mod expiry;
pub mod volatility;

pub use black_scholes::*;
pub use expiry::*;
pub use volatility::*;
