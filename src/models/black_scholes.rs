//! Black-Scholes Model
//!
//! Provides:
//! - Standard normal CDF/PDF and the `d1`/`d2` terms
//! - European call/put pricing
//! - Greeks (delta, gamma, vega, theta, rho) for calls and puts
//!
//! The formula functions are generic over [`Strikes`]: pass a single `f64`
//! strike to get an `f64`, or a slice of strikes to get a `Vec<f64>` evaluated
//! elementwise against the same spot, rate, time and volatility. They follow
//! plain floating-point semantics, so `time <= 0` or `vol <= 0` produce
//! NaN/Inf. [`PricingInputs`], [`greeks`] and [`price_strikes`] validate their
//! inputs and return [`BSError::DegenerateInput`] instead.

use std::f64::consts::{PI, SQRT_2};

use rayon::prelude::*;
use statrs::function::erf::erfc;

use crate::core::{BSError, BSResult, Greeks, OptionType, PricingResult};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// A scalar strike or a sequence of strikes.
///
/// Sequences are evaluated as an order-preserving parallel map.
pub trait Strikes {
    type Output;

    fn map_strikes<F>(self, f: F) -> Self::Output
    where
        F: Fn(f64) -> f64 + Sync + Send;
}

impl Strikes for f64 {
    type Output = f64;

    fn map_strikes<F>(self, f: F) -> f64
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        f(self)
    }
}

impl Strikes for &[f64] {
    type Output = Vec<f64>;

    fn map_strikes<F>(self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        self.par_iter().map(|&k| f(k)).collect()
    }
}

impl Strikes for &Vec<f64> {
    type Output = Vec<f64>;

    fn map_strikes<F>(self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        self.as_slice().map_strikes(f)
    }
}

impl<const N: usize> Strikes for &[f64; N] {
    type Output = Vec<f64>;

    fn map_strikes<F>(self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        self.as_slice().map_strikes(f)
    }
}

fn d1_at(spot: f64, strike: f64, rate: f64, time: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

fn d2_at(spot: f64, strike: f64, rate: f64, time: f64, vol: f64) -> f64 {
    d1_at(spot, strike, rate, time, vol) - vol * time.sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| d1_at(spot, k, rate, time, vol))
}

/// Black-Scholes d2 parameter
pub fn d2<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| d2_at(spot, k, rate, time, vol))
}

/// European call price: Φ(d1)·S − Φ(d2)·K·e^(−rτ)
pub fn call_price<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        let d1 = d1_at(spot, k, rate, time, vol);
        let d2 = d1 - vol * time.sqrt();
        norm_cdf(d1) * spot - norm_cdf(d2) * k * (-rate * time).exp()
    })
}

/// European put price: Φ(−d2)·K·e^(−rτ) − Φ(−d1)·S
pub fn put_price<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        let d1 = d1_at(spot, k, rate, time, vol);
        let d2 = d1 - vol * time.sqrt();
        norm_cdf(-d2) * k * (-rate * time).exp() - norm_cdf(-d1) * spot
    })
}

// Greeks - call

pub fn delta_call<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| norm_cdf(d1_at(spot, k, rate, time, vol)))
}

pub fn gamma_call<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| norm_pdf(d1_at(spot, k, rate, time, vol)) / (spot * vol * time.sqrt()))
}

pub fn vega_call<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| spot * norm_pdf(d1_at(spot, k, rate, time, vol)) * time.sqrt())
}

pub fn theta_call<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        let d1 = d1_at(spot, k, rate, time, vol);
        let d2 = d1 - vol * time.sqrt();
        -spot * norm_pdf(d1) * vol / (2.0 * time.sqrt())
            - rate * k * (-rate * time).exp() * norm_cdf(d2)
    })
}

pub fn rho_call<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        k * time * (-rate * time).exp() * norm_cdf(d2_at(spot, k, rate, time, vol))
    })
}

// Greeks - put

pub fn delta_put<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| norm_cdf(d1_at(spot, k, rate, time, vol)) - 1.0)
}

pub fn gamma_put<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    gamma_call(spot, strike, rate, time, vol)
}

pub fn vega_put<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    vega_call(spot, strike, rate, time, vol)
}

pub fn theta_put<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        let d1 = d1_at(spot, k, rate, time, vol);
        let d2 = d1 - vol * time.sqrt();
        -spot * norm_pdf(d1) * vol / (2.0 * time.sqrt())
            + rate * k * (-rate * time).exp() * norm_cdf(-d2)
    })
}

pub fn rho_put<K: Strikes>(spot: f64, strike: K, rate: f64, time: f64, vol: f64) -> K::Output {
    strike.map_strikes(|k| {
        -k * time * (-rate * time).exp() * norm_cdf(-d2_at(spot, k, rate, time, vol))
    })
}

/// Validated Black-Scholes inputs for a single strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInputs {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub time: f64,
    pub vol: f64,
}

impl PricingInputs {
    /// Rejects non-finite values and non-positive spot, strike, time or vol.
    pub fn new(spot: f64, strike: f64, rate: f64, time: f64, vol: f64) -> BSResult<Self> {
        check_market(spot, rate, time, vol)?;
        check_strike(strike)?;
        Ok(Self {
            spot,
            strike,
            rate,
            time,
            vol,
        })
    }

    pub fn d1(&self) -> f64 {
        d1_at(self.spot, self.strike, self.rate, self.time, self.vol)
    }

    pub fn d2(&self) -> f64 {
        d2_at(self.spot, self.strike, self.rate, self.time, self.vol)
    }

    pub fn price(&self, option_type: OptionType) -> f64 {
        match option_type {
            OptionType::Call => call_price(self.spot, self.strike, self.rate, self.time, self.vol),
            OptionType::Put => put_price(self.spot, self.strike, self.rate, self.time, self.vol),
        }
    }

    /// All five Greeks, sharing one evaluation of d1/d2
    pub fn greeks(&self, option_type: OptionType) -> Greeks {
        let Self {
            spot,
            strike,
            rate,
            time,
            vol,
        } = *self;

        let sqrt_t = time.sqrt();
        let d1 = self.d1();
        let d2 = d1 - vol * sqrt_t;
        let pdf_d1 = norm_pdf(d1);
        let df = (-rate * time).exp();

        // Gamma and vega are the same for call and put
        let gamma = pdf_d1 / (spot * vol * sqrt_t);
        let vega = spot * pdf_d1 * sqrt_t;
        let decay = -spot * pdf_d1 * vol / (2.0 * sqrt_t);

        match option_type {
            OptionType::Call => Greeks::new(
                norm_cdf(d1),
                gamma,
                vega,
                decay - rate * strike * df * norm_cdf(d2),
                strike * time * df * norm_cdf(d2),
            ),
            OptionType::Put => Greeks::new(
                norm_cdf(d1) - 1.0,
                gamma,
                vega,
                decay + rate * strike * df * norm_cdf(-d2),
                -strike * time * df * norm_cdf(-d2),
            ),
        }
    }

    pub fn result(&self, option_type: OptionType) -> PricingResult {
        PricingResult {
            price: self.price(option_type),
            greeks: self.greeks(option_type),
        }
    }
}

fn check_market(spot: f64, rate: f64, time: f64, vol: f64) -> BSResult<()> {
    if !(spot.is_finite() && spot > 0.0) {
        return Err(BSError::degenerate(format!("spot must be positive, got {}", spot)));
    }
    if !rate.is_finite() {
        return Err(BSError::degenerate(format!("rate must be finite, got {}", rate)));
    }
    if !(time.is_finite() && time > 0.0) {
        return Err(BSError::degenerate(format!(
            "time to maturity must be positive, got {}",
            time
        )));
    }
    if !(vol.is_finite() && vol > 0.0) {
        return Err(BSError::degenerate(format!("volatility must be positive, got {}", vol)));
    }
    Ok(())
}

fn check_strike(strike: f64) -> BSResult<()> {
    if !(strike.is_finite() && strike > 0.0) {
        return Err(BSError::degenerate(format!("strike must be positive, got {}", strike)));
    }
    Ok(())
}

/// Bundled Greeks (delta, gamma, vega, theta, rho) for one strike
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    vol: f64,
    option_type: OptionType,
) -> BSResult<Greeks> {
    Ok(PricingInputs::new(spot, strike, rate, time, vol)?.greeks(option_type))
}

/// Price and Greeks for one strike
pub fn price_result(
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    vol: f64,
    option_type: OptionType,
) -> BSResult<PricingResult> {
    Ok(PricingInputs::new(spot, strike, rate, time, vol)?.result(option_type))
}

/// Price and Greeks for every strike against one (spot, rate, time, vol).
///
/// Output order matches `strikes`.
pub fn price_strikes(
    spot: f64,
    strikes: &[f64],
    rate: f64,
    time: f64,
    vol: f64,
    option_type: OptionType,
) -> BSResult<Vec<PricingResult>> {
    check_market(spot, rate, time, vol)?;
    strikes.iter().try_for_each(|&k| check_strike(k))?;

    Ok(strikes
        .par_iter()
        .map(|&strike| {
            PricingInputs {
                spot,
                strike,
                rate,
                time,
                vol,
            }
            .result(option_type)
        })
        .collect())
}
