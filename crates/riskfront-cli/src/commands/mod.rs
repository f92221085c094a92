pub mod compare;
pub mod estimate;
pub mod frontier;
pub mod hrp;

use chrono::NaiveDate;
use clap::Args;
use serde::de::DeserializeOwned;
use std::error::Error;

use riskfront_core::estimation::ReturnFrequency;
use riskfront_core::market_data::{DateRange, PriceDataProvider, PriceSeries};

use crate::input;
use crate::input::csv_prices::CsvPriceProvider;

/// Where to read prices from when no JSON request is given.
#[derive(Args, Debug, Clone)]
pub struct PriceArgs {
    /// Wide price CSV: a date column followed by one column per symbol
    #[arg(long)]
    pub prices: Option<String>,

    /// Comma-separated symbols to load (default: every symbol in the file)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Spacing of the price rows: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: ReturnFrequency,
}

/// Monte Carlo knobs. Unset flags leave the request's values alone.
#[derive(Args, Debug, Clone)]
pub struct SimulationArgs {
    /// Number of random portfolios
    #[arg(long)]
    pub trials: Option<u32>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Annual risk-free rate
    #[arg(long, allow_hyphen_values = true)]
    pub risk_free_rate: Option<f64>,

    /// Include every simulated portfolio in the output
    #[arg(long)]
    pub include_records: bool,
}

/// A request either read as JSON (`--input` or stdin) or to be assembled
/// from a price CSV.
pub enum Request<T> {
    Json(T),
    Prices(PriceSeries),
}

/// `--input` first, then `--prices`, then stdin.
pub fn resolve_request<T: DeserializeOwned>(
    input_path: Option<&str>,
    prices: &PriceArgs,
    what: &str,
) -> Result<Request<T>, Box<dyn Error>> {
    if let Some(path) = input_path {
        return Ok(Request::Json(input::file::read_json(path)?));
    }
    if prices.prices.is_some() {
        return Ok(Request::Prices(load_prices(prices)?));
    }
    if let Some(request) = input::stdin::read_stdin()? {
        return Ok(Request::Json(request));
    }
    Err(format!("--input <file.json>, --prices <file.csv> or stdin required for {what}").into())
}

/// Load the requested symbols and dates from the `--prices` CSV.
pub fn load_prices(args: &PriceArgs) -> Result<PriceSeries, Box<dyn Error>> {
    let path = args.prices.as_deref().ok_or("--prices <file.csv> required")?;
    let provider = CsvPriceProvider::open(path)?;
    let symbols = if args.symbols.is_empty() {
        provider.symbols()?
    } else {
        args.symbols.clone()
    };
    let range = date_range(args)?;
    Ok(provider.fetch_prices(&symbols, &range)?)
}

pub fn date_range(args: &PriceArgs) -> Result<DateRange, Box<dyn Error>> {
    let start = args.start.unwrap_or(NaiveDate::MIN);
    let end = args.end.unwrap_or(NaiveDate::MAX);
    Ok(DateRange::new(start, end)?)
}
