//! Option Greeks
//!
//! First and second order sensitivities of the Black-Scholes price.

use serde::{Deserialize, Serialize};

/// Option Greeks (sensitivities)
///
/// Raw model units: theta is per year, vega per 1.00 of volatility and rho
/// per 1.00 of rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS (sensitivity to spot)
    pub delta: f64,
    /// Gamma: d²V/dS² (sensitivity of delta to spot)
    pub gamma: f64,
    /// Vega: dV/dσ (sensitivity to volatility)
    pub vega: f64,
    /// Theta: dV/dt (time decay)
    pub theta: f64,
    /// Rho: dV/dr (sensitivity to interest rate)
    pub rho: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, vega: f64, theta: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            vega,
            theta,
            rho,
        }
    }

    /// (delta, gamma, vega, theta, rho)
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (self.delta, self.gamma, self.vega, self.theta, self.rho)
    }

    pub fn is_finite(&self) -> bool {
        self.delta.is_finite()
            && self.gamma.is_finite()
            && self.vega.is_finite()
            && self.theta.is_finite()
            && self.rho.is_finite()
    }
}
