//! BS Options CLI
//!
//! Prices one option chain against Black-Scholes and prints the spread
//! between model and market for every contract.
//!
//! # Month calls for AAPL from Yahoo Finance
//! bs-chain --ticker AAPL --type call --interval month
//!
//! # Refetch AAPL instead of reading the cache
//! bs-chain --ticker AAPL --refresh
//!
//! # Offline, from a saved snapshot, as of a fixed date
//! bs-chain --ticker AAPL --type put --interval quarter --date 2024-10-18 --snapshot data/aapl.json

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::Parser;

use bs_options::prelude::*;

#[derive(Parser)]
#[command(name = "bs-chain")]
#[command(about = "Black-Scholes valuation and market spread for an option chain")]
#[command(version)]
struct Cli {
    /// Underlying ticker
    #[arg(short, long, default_value = "AAPL")]
    ticker: String,

    /// Option type: call or put
    #[arg(long = "type", default_value = "call")]
    option_type: String,

    /// Expiration interval: month, quarter, year or two_years
    #[arg(short, long, default_value = "month")]
    interval: String,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Risk-free rate, overrides the config file
    #[arg(short, long)]
    rate: Option<f64>,

    /// Pricing configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read market data from a JSON snapshot instead of Yahoo Finance
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Cache directory for Yahoo Finance data
    #[arg(long, default_value = "data/cache")]
    cache_dir: PathBuf,

    /// Always fetch fresh data
    #[arg(long)]
    no_cache: bool,

    /// Drop cached data for the ticker before fetching
    #[arg(long)]
    refresh: bool,

    /// Empty the cache directory before fetching
    #[arg(long)]
    clear_cache: bool,

    /// Print the priced chain as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> BSResult<()> {
    let option_type: OptionType = cli.option_type.parse()?;
    let interval: Interval = cli.interval.parse()?;
    let reference_date = cli.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut config = match &cli.config {
        Some(path) => PricingConfig::from_file(path)?,
        None => PricingConfig::default(),
    };
    if let Some(rate) = cli.rate {
        config = config.with_rate(rate);
    }

    let cache = CacheConfig {
        cache_dir: cli.cache_dir.clone(),
        ..Default::default()
    };
    if cli.clear_cache {
        let removed = DataCache::new(cache.clone())?.clear_all()?;
        tracing::info!("Removed {} cached files from {}", removed, cli.cache_dir.display());
    }

    let market: Box<dyn MarketData> = match &cli.snapshot {
        Some(path) => Box::new(Snapshot::from_file(path)?),
        None if cli.no_cache => Box::new(YahooClient::new()?),
        None => {
            let fetcher = CachedFetcher::new(cache, YahooClient::new()?)?;
            if cli.refresh {
                let removed = fetcher.invalidate(&cli.ticker)?;
                tracing::info!("Dropped {} cached files for {}", removed, cli.ticker);
            }
            Box::new(fetcher)
        }
    };

    let chain = price_option_chain(
        market.as_ref(),
        &cli.ticker,
        option_type,
        interval,
        reference_date,
        &config,
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&chain)?);
    } else {
        print_chain(&chain);
    }
    Ok(())
}

fn print_chain(chain: &PricedChain) {
    println!(
        "{:<22} {:>8} {:>8} {:>8} {:>7} {:>9} {:>10} {:>7} {:>8} {:>9} {:>9} {:>9}",
        "Contract", "Strike", "Last", "Ask", "IV", "BS", "Spread(%)", "delta", "gamma", "vega", "theta", "rho"
    );

    for row in &chain.rows {
        let g = row.greeks();
        let ask = row
            .quote
            .ask
            .map(|a| format!("{:.2}", a))
            .unwrap_or_else(|| "-".into());
        let spread = row
            .spread_pct
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".into());

        println!(
            "{:<22} {:>8.2} {:>8.2} {:>8} {:>7.4} {:>9.4} {:>10} {:>7.4} {:>8.5} {:>9.4} {:>9.4} {:>9.4}",
            row.quote.contract.symbol,
            row.quote.strike(),
            row.quote.last,
            ask,
            row.quote.implied_vol,
            row.theoretical_price(),
            spread,
            g.delta,
            g.gamma,
            g.vega,
            g.theta,
            g.rho
        );
    }

    println!();
    println!("current_price = {:.4}", chain.spot);
    println!("sigma = {:.6}", chain.sigma);
    println!("expiration_date = {}", chain.expiration.date);
    println!("days_to_expiration = {}", chain.expiration.days);
}
