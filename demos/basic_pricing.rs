//! Example: Basic options pricing with Black-Scholes
//!
//! Run with: cargo run --example basic_pricing

use bs_options::prelude::*;
use chrono::NaiveDate;

fn main() -> BSResult<()> {
    // Option parameters
    let spot = 150.0;
    let strike = 150.0;
    let rate = 0.04; // 4% risk-free rate
    let vol = 0.25; // 25% volatility

    let today = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
    let expiration = compute_expiration(today, Interval::Month)?;
    let time = expiration.tau;

    println!("=== Black-Scholes Pricing ===\n");
    println!("Spot:     ${:.2}", spot);
    println!("Strike:   ${:.2}", strike);
    println!("Expiry:   {} ({} days, tau={:.4})", expiration.date, expiration.days, time);
    println!("Rate:     {:.1}%", rate * 100.0);
    println!("Vol:      {:.1}%\n", vol * 100.0);

    let call = call_price(spot, strike, rate, time, vol);
    let put = put_price(spot, strike, rate, time, vol);
    println!("Call Price: ${:.4}", call);
    println!("Put Price:  ${:.4}", put);

    // Verify put-call parity: C - P = S - K*e^(-rT)
    let parity_lhs = call - put;
    let parity_rhs = spot - strike * (-rate * time).exp();
    println!("\nPut-Call Parity Check:");
    println!("  C - P = {:.4}", parity_lhs);
    println!("  S - K*e^(-rT) = {:.4}", parity_rhs);
    println!("  Difference: {:.6}", (parity_lhs - parity_rhs).abs());

    println!("\n=== Greeks ===\n");
    for option_type in [OptionType::Call, OptionType::Put] {
        let g = bs_greeks(spot, strike, rate, time, vol, option_type)?;
        println!(
            "{:<4}  delta {:>7.4}  gamma {:.4}  vega {:.4}  theta {:>8.4}  rho {:>7.4}",
            option_type,
            g.delta,
            g.gamma,
            g.vega,
            g.theta,
            g.rho
        );
    }

    // A strip of strikes priced in one call
    println!("\n=== Strike Strip ===\n");
    let strikes = [140.0, 145.0, 150.0, 155.0, 160.0];
    let calls = call_price(spot, &strikes, rate, time, vol);
    let puts = put_price(spot, &strikes, rate, time, vol);
    for ((k, c), p) in strikes.iter().zip(&calls).zip(&puts) {
        println!("K={:>6.1}  call {:>8.4}  put {:>8.4}", k, c, p);
    }

    Ok(())
}
