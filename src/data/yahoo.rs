//! Yahoo Finance data fetcher
//!
//! Fetches free daily closes and option chains for US equities.
//! Uses Yahoo Finance's unofficial API.
//!
//! Note: This is for educational/research purposes. Yahoo Finance
//! data is delayed ~15 minutes and intended for personal use.

use chrono::{DateTime, Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::MarketData;
use crate::core::{
    BSError, BSResult, OptionContract, OptionQuote, OptionType, PricePoint, PriceSeries,
};

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> BSResult<Self> {
        Self::with_base_url("https://query1.finance.yahoo.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> BSResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| BSError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> BSResult<T> {
        tracing::debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| BSError::network(e.to_string()))?
            .json()
            .map_err(|e| BSError::data(format!("Failed to parse {}: {}", what, e)))
    }

    /// Daily closes between `start` and `end` (inclusive)
    pub fn get_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BSResult<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            symbol,
            midnight_utc(start)?,
            midnight_utc(end + Duration::days(1))?
        );

        let response: YahooChartResponse = self.get_json(&url, "chart")?;
        if let Some(err) = response.chart.error {
            return Err(BSError::data(format!("Chart error for {}: {}", symbol, err.description)));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| BSError::data("No chart data returned"))?;

        let points = chart_points(&result);
        tracing::info!("Fetched {} daily closes for {}", points.len(), symbol);

        PriceSeries::new(points).map(|s| s.between(start, end))
    }

    /// Option chain of one type for a specific expiration
    pub fn get_option_chain(
        &self,
        symbol: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Vec<OptionQuote>> {
        let url = format!(
            "{}/v7/finance/options/{}?date={}",
            self.base_url,
            symbol,
            midnight_utc(expiry)?
        );

        let response: YahooOptionsResponse = self.get_json(&url, "options")?;

        let chain_data = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| BSError::data("No options data returned"))?;

        let options = chain_data
            .options
            .into_iter()
            .next()
            .ok_or_else(|| BSError::data(format!("No {} options listed for {}", symbol, expiry)))?;

        let rows = match option_type {
            OptionType::Call => options.calls,
            OptionType::Put => options.puts,
        };

        let quotes: Vec<OptionQuote> = rows
            .iter()
            .filter_map(|row| convert_option_quote(row, symbol, expiry, option_type))
            .collect();

        if quotes.is_empty() {
            return Err(BSError::data(format!(
                "No {} {} contracts listed for {}",
                symbol, option_type, expiry
            )));
        }

        tracing::info!("Fetched {} {} {} contracts for {}", quotes.len(), symbol, option_type, expiry);
        Ok(quotes)
    }
}

impl MarketData for YahooClient {
    fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> BSResult<PriceSeries> {
        self.get_price_history(ticker, start, end)
    }

    fn option_chain(
        &self,
        ticker: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Vec<OptionQuote>> {
        self.get_option_chain(ticker, option_type, expiry)
    }
}

fn midnight_utc(date: NaiveDate) -> BSResult<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| BSError::data(format!("Invalid date {}", date)))
}

/// Daily closes keyed by exchange-local date. Null closes are skipped and a
/// repeated date keeps the later bar.
fn chart_points(result: &YahooChartResult) -> Vec<PricePoint> {
    let offset = result.meta.as_ref().map(|m| m.gmtoffset).unwrap_or(0);
    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or(&[]);

    let mut points: Vec<PricePoint> = Vec::with_capacity(closes.len());
    for (&ts, close) in result.timestamp.iter().zip(closes) {
        let (Some(close), Some(dt)) = (*close, DateTime::from_timestamp(ts + offset, 0)) else {
            continue;
        };
        let point = PricePoint::new(dt.date_naive(), close);

        match points.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            Some(last) if last.date > point.date => {
                tracing::warn!("Dropping out-of-order bar at {}", point.date);
            }
            _ => points.push(point),
        }
    }
    points
}

/// Convert Yahoo option data to our quote format
fn convert_option_quote(
    data: &YahooOptionData,
    underlying: &str,
    expiry: NaiveDate,
    option_type: OptionType,
) -> Option<OptionQuote> {
    let (Some(strike), Some(last)) = (data.strike, data.last_price) else {
        tracing::warn!(
            "Skipping {:?}: missing strike or last price",
            data.contract_symbol
        );
        return None;
    };

    let contract = OptionContract::new(
        underlying,
        data.contract_symbol.clone().unwrap_or_default(),
        strike,
        expiry,
        option_type,
    );

    let mut quote = OptionQuote::new(contract, last, data.implied_volatility.unwrap_or(0.0));
    quote.ask = data.ask;
    Some(quote)
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooBars>,
}

#[derive(Debug, Deserialize)]
struct YahooBars {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    #[serde(rename = "contractSymbol")]
    contract_symbol: Option<String>,
    strike: Option<f64>,
    ask: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
    #[serde(rename = "impliedVolatility")]
    implied_volatility: Option<f64>,
}
