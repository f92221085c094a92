use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::RiskfrontError;
use crate::RiskfrontResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Serialized shape of a date range, checked on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRangeData {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeData")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> RiskfrontResult<Self> {
        if start > end {
            return Err(RiskfrontError::InvalidInput {
                field: "date_range".into(),
                reason: format!("start {start} is after end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl TryFrom<DateRangeData> for DateRange {
    type Error = RiskfrontError;

    fn try_from(data: DateRangeData) -> Result<Self, Self::Error> {
        DateRange::new(data.start, data.end)
    }
}

/// Serialized shape of a price table: one row of prices per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeriesData {
    pub assets: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<Vec<f64>>,
}

/// Chronological price table, one column per asset.
///
/// Construction validates the table shape: unique asset labels, one price
/// per asset on every row, and strictly increasing dates (which rules out
/// duplicate timestamps). Price positivity is left to the return estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceSeriesData")]
pub struct PriceSeries {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    prices: Vec<Vec<f64>>,
}

impl TryFrom<PriceSeriesData> for PriceSeries {
    type Error = RiskfrontError;

    fn try_from(data: PriceSeriesData) -> Result<Self, Self::Error> {
        PriceSeries::new(data.assets, data.dates, data.prices)
    }
}

impl PriceSeries {
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        prices: Vec<Vec<f64>>,
    ) -> RiskfrontResult<Self> {
        if assets.is_empty() {
            return Err(RiskfrontError::DataError(
                "Price series must contain at least one asset".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for name in &assets {
            if !seen.insert(name.as_str()) {
                return Err(RiskfrontError::DataError(format!(
                    "Duplicate asset column '{name}'"
                )));
            }
        }

        if dates.len() != prices.len() {
            return Err(RiskfrontError::DataError(format!(
                "{} dates but {} price rows",
                dates.len(),
                prices.len()
            )));
        }

        for (i, row) in prices.iter().enumerate() {
            if row.len() != assets.len() {
                return Err(RiskfrontError::DataError(format!(
                    "Row {} ({}) has {} prices, expected {}",
                    i,
                    dates[i],
                    row.len(),
                    assets.len()
                )));
            }
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(RiskfrontError::DataError(format!(
                    "Dates must be strictly increasing: {} followed by {}",
                    pair[0], pair[1]
                )));
            }
        }

        Ok(Self {
            assets,
            dates,
            prices,
        })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Price rows in chronological order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.prices
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_periods(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn asset_index(&self, symbol: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == symbol)
    }

    /// Restrict the table to `symbols` (in the requested order) and to the
    /// rows falling inside `range`.
    pub fn select(&self, symbols: &[String], range: &DateRange) -> RiskfrontResult<PriceSeries> {
        if symbols.is_empty() {
            return Err(RiskfrontError::InvalidInput {
                field: "symbols".into(),
                reason: "At least one symbol is required".into(),
            });
        }

        let columns = symbols
            .iter()
            .map(|s| {
                self.asset_index(s).ok_or_else(|| {
                    RiskfrontError::DataUnavailable(format!("No price data for symbol '{s}'"))
                })
            })
            .collect::<RiskfrontResult<Vec<usize>>>()?;

        let mut dates = Vec::new();
        let mut prices = Vec::new();
        for (date, row) in self.dates.iter().zip(self.prices.iter()) {
            if range.contains(*date) {
                dates.push(*date);
                prices.push(columns.iter().map(|&c| row[c]).collect());
            }
        }

        if dates.is_empty() {
            return Err(RiskfrontError::DataUnavailable(format!(
                "No price rows between {} and {}",
                range.start, range.end
            )));
        }

        PriceSeries::new(symbols.to_vec(), dates, prices)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
