use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use crate::error::RiskfrontError;
use crate::estimation::matrix::{column_means, cov_to_corr, sample_covariance};
use crate::market_data::PriceSeries;
use crate::types::{with_metadata, ComputationOutput};
use crate::RiskfrontResult;

/// Below this many return rows the estimates are flagged as noisy.
const MIN_RELIABLE_OBSERVATIONS: usize = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Frequency of price observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> f64 {
        match self {
            ReturnFrequency::Daily => 252.0,
            ReturnFrequency::Weekly => 52.0,
            ReturnFrequency::Monthly => 12.0,
            ReturnFrequency::Quarterly => 4.0,
            ReturnFrequency::Annual => 1.0,
        }
    }
}

impl FromStr for ReturnFrequency {
    type Err = RiskfrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "d" => Ok(ReturnFrequency::Daily),
            "weekly" | "w" => Ok(ReturnFrequency::Weekly),
            "monthly" | "m" => Ok(ReturnFrequency::Monthly),
            "quarterly" | "q" => Ok(ReturnFrequency::Quarterly),
            "annual" | "yearly" | "a" | "y" => Ok(ReturnFrequency::Annual),
            other => Err(RiskfrontError::InvalidInput {
                field: "frequency".into(),
                reason: format!(
                    "Unknown frequency '{other}' (expected daily, weekly, monthly, quarterly or annual)"
                ),
            }),
        }
    }
}

/// Serialized shape of a return table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeriesData {
    pub assets: Vec<String>,
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    pub returns: Vec<Vec<f64>>,
}

/// Period-over-period fractional changes, (T-1) rows x N assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReturnSeriesData")]
pub struct ReturnSeries {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    returns: Vec<Vec<f64>>,
}

impl TryFrom<ReturnSeriesData> for ReturnSeries {
    type Error = RiskfrontError;

    fn try_from(data: ReturnSeriesData) -> Result<Self, Self::Error> {
        ReturnSeries::new(data.assets, data.dates, data.returns)
    }
}

impl ReturnSeries {
    /// Build a return table directly. `dates` may be empty when the rows
    /// carry no timestamps.
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        returns: Vec<Vec<f64>>,
    ) -> RiskfrontResult<Self> {
        if assets.is_empty() {
            return Err(RiskfrontError::DataError(
                "Return series must contain at least one asset".into(),
            ));
        }
        if !dates.is_empty() && dates.len() != returns.len() {
            return Err(RiskfrontError::DataError(format!(
                "{} dates but {} return rows",
                dates.len(),
                returns.len()
            )));
        }
        for (i, row) in returns.iter().enumerate() {
            if row.len() != assets.len() {
                return Err(RiskfrontError::DataError(format!(
                    "Return row {} has {} values, expected {}",
                    i,
                    row.len(),
                    assets.len()
                )));
            }
            if let Some(v) = row.iter().find(|v| !v.is_finite()) {
                return Err(RiskfrontError::DataError(format!(
                    "Return row {i} contains non-finite value {v}"
                )));
            }
        }
        Ok(Self {
            assets,
            dates,
            returns,
        })
    }

    /// Fractional change of every price relative to the previous row. The
    /// first row has no predecessor and is dropped.
    pub fn from_prices(prices: &PriceSeries) -> RiskfrontResult<Self> {
        if prices.n_periods() < 2 {
            return Err(RiskfrontError::DataError(format!(
                "At least 2 price rows required, got {}",
                prices.n_periods()
            )));
        }

        for (row, date) in prices.rows().iter().zip(prices.dates()) {
            for (p, asset) in row.iter().zip(prices.assets()) {
                if !p.is_finite() || *p <= 0.0 {
                    return Err(RiskfrontError::DataError(format!(
                        "Invalid price {p} for {asset} on {date}"
                    )));
                }
            }
        }

        let returns: Vec<Vec<f64>> = prices
            .rows()
            .windows(2)
            .map(|pair| {
                pair[1]
                    .iter()
                    .zip(pair[0].iter())
                    .map(|(cur, prev)| cur / prev - 1.0)
                    .collect()
            })
            .collect();

        Self::new(
            prices.assets().to_vec(),
            prices.dates()[1..].to_vec(),
            returns,
        )
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.returns
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_periods(&self) -> usize {
        self.returns.len()
    }

    pub fn column(&self, asset: usize) -> Vec<f64> {
        self.returns.iter().map(|r| r[asset]).collect()
    }

    /// Per-period (not annualized) mean of each asset.
    pub fn mean(&self) -> Vec<f64> {
        column_means(&self.returns, self.n_assets())
    }

    /// Per-period (not annualized) sample covariance.
    pub fn covariance(&self) -> RiskfrontResult<Vec<Vec<f64>>> {
        if self.n_periods() < 2 {
            return Err(RiskfrontError::DataError(format!(
                "At least 2 return rows required for a covariance estimate, got {}",
                self.n_periods()
            )));
        }
        Ok(sample_covariance(&self.returns, self.n_assets()))
    }

    /// Pearson correlation of the asset columns.
    pub fn correlation(&self) -> RiskfrontResult<Vec<Vec<f64>>> {
        cov_to_corr(&self.covariance()?)
    }
}

/// Input for the return estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationInput {
    pub prices: PriceSeries,
    #[serde(default)]
    pub frequency: ReturnFrequency,
}

/// Annualized estimates derived once from a price table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnEstimates {
    pub returns: ReturnSeries,
    /// Annualized mean return per asset.
    pub mean_returns: Vec<f64>,
    /// Annualized sample covariance, same asset ordering as `mean_returns`.
    pub covariance: Vec<Vec<f64>>,
    pub periods_per_year: f64,
}

impl ReturnEstimates {
    pub fn assets(&self) -> &[String] {
        self.returns.assets()
    }

    pub fn n_assets(&self) -> usize {
        self.mean_returns.len()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the return series, annualized means and annualized covariance.
///
/// Fails with `DataError` on fewer than two price rows, a non-positive
/// price, or an asset whose returns have zero variance.
pub fn estimate_returns(
    prices: &PriceSeries,
    frequency: ReturnFrequency,
) -> RiskfrontResult<ReturnEstimates> {
    let returns = ReturnSeries::from_prices(prices)?;
    let periods = frequency.periods_per_year();

    if returns.n_periods() < 2 {
        return Err(RiskfrontError::DataError(format!(
            "Returns of every asset have zero variance: only {} return row",
            returns.n_periods()
        )));
    }

    let mean_returns: Vec<f64> = returns.mean().iter().map(|m| m * periods).collect();
    let covariance: Vec<Vec<f64>> = returns
        .covariance()?
        .into_iter()
        .map(|row| row.into_iter().map(|c| c * periods).collect())
        .collect();

    for (i, asset) in returns.assets().iter().enumerate() {
        let v = covariance[i][i];
        if v.is_nan() || v <= 0.0 {
            return Err(RiskfrontError::DataError(format!(
                "Returns of {asset} have zero variance"
            )));
        }
    }

    debug!(
        assets = returns.n_assets(),
        periods = returns.n_periods(),
        periods_per_year = periods,
        "estimated annualized returns and covariance"
    );

    Ok(ReturnEstimates {
        returns,
        mean_returns,
        covariance,
        periods_per_year: periods,
    })
}

/// Warnings about a history too short to trust.
pub(crate) fn history_warnings(estimates: &ReturnEstimates) -> Vec<String> {
    let mut warnings = Vec::new();
    let n_obs = estimates.returns.n_periods();
    if n_obs < MIN_RELIABLE_OBSERVATIONS {
        warnings.push(format!(
            "Only {n_obs} return observations; estimates are noisy"
        ));
    }
    if n_obs <= estimates.n_assets() {
        warnings.push(format!(
            "{} observations for {} assets: covariance matrix is singular",
            n_obs,
            estimates.n_assets()
        ));
    }
    warnings
}

/// Envelope wrapper around [`estimate_returns`].
pub fn calculate_return_estimates(
    input: &EstimationInput,
) -> RiskfrontResult<ComputationOutput<ReturnEstimates>> {
    let start = Instant::now();
    let estimates = estimate_returns(&input.prices, input.frequency)?;
    let warnings = history_warnings(&estimates);
    let n_obs = estimates.returns.n_periods();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annualized Sample Mean and Covariance of Simple Returns",
        &serde_json::json!({
            "n_assets": estimates.n_assets(),
            "n_observations": n_obs,
            "frequency": input.frequency,
            "periods_per_year": estimates.periods_per_year,
            "covariance_denominator": "n - 1",
        }),
        warnings,
        elapsed,
        estimates,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, day).unwrap()
    }

    fn prices(rows: Vec<Vec<f64>>) -> PriceSeries {
        let dates = (1..=rows.len() as u32).map(d).collect();
        let assets = (0..rows[0].len()).map(|i| format!("A{i}")).collect();
        PriceSeries::new(assets, dates, rows).unwrap()
    }

    #[test]
    fn test_returns_drop_first_row() {
        let p = prices(vec![vec![100.0, 50.0], vec![110.0, 45.0], vec![99.0, 54.0]]);
        let r = ReturnSeries::from_prices(&p).unwrap();
        assert_eq!(r.n_periods(), 2);
        assert_eq!(r.dates(), &[d(2), d(3)]);
        assert!((r.rows()[0][0] - 0.10).abs() < 1e-12);
        assert!((r.rows()[0][1] + 0.10).abs() < 1e-12);
        assert!((r.rows()[1][0] + 0.10).abs() < 1e-12);
        assert!((r.rows()[1][1] - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_hand_computed_estimates() {
        // Returns: A = [0.1, -0.1, 0.1], B = [-0.1, 0.2, 0.0]
        let p = prices(vec![
            vec![100.0, 100.0],
            vec![110.0, 90.0],
            vec![99.0, 108.0],
            vec![108.9, 108.0],
        ]);
        let est = estimate_returns(&p, ReturnFrequency::Daily).unwrap();

        let mean_a = 0.1 / 3.0;
        let mean_b = 0.1 / 3.0;
        assert!((est.mean_returns[0] - mean_a * 252.0).abs() < 1e-9);
        assert!((est.mean_returns[1] - mean_b * 252.0).abs() < 1e-9);

        let var_a = ((0.1 - mean_a).powi(2) * 2.0 + (-0.1 - mean_a).powi(2)) / 2.0;
        assert!((est.covariance[0][0] - var_a * 252.0).abs() < 1e-9);

        let cov_ab = ((0.1 - mean_a) * (-0.1 - mean_b)
            + (-0.1 - mean_a) * (0.2 - mean_b)
            + (0.1 - mean_a) * (0.0 - mean_b))
            / 2.0;
        assert!((est.covariance[0][1] - cov_ab * 252.0).abs() < 1e-9);
        assert_eq!(est.covariance[0][1], est.covariance[1][0]);
    }

    #[test]
    fn test_annualization_factor_applied() {
        let rows = vec![vec![100.0], vec![101.0], vec![103.0], vec![102.0]];
        let daily = estimate_returns(&prices(rows.clone()), ReturnFrequency::Daily).unwrap();
        let monthly = estimate_returns(&prices(rows), ReturnFrequency::Monthly).unwrap();
        let ratio = daily.covariance[0][0] / monthly.covariance[0][0];
        assert!((ratio - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_row_rejected() {
        let p = prices(vec![vec![100.0, 50.0]]);
        let r = estimate_returns(&p, ReturnFrequency::Daily);
        assert!(matches!(r, Err(RiskfrontError::DataError(_))));
    }

    #[test]
    fn test_two_rows_rejected_as_zero_variance() {
        let p = prices(vec![vec![100.0, 50.0], vec![101.0, 51.0]]);
        let r = estimate_returns(&p, ReturnFrequency::Daily);
        assert!(matches!(r, Err(RiskfrontError::DataError(_))));
    }

    #[test]
    fn test_constant_column_rejected() {
        let p = prices(vec![vec![100.0, 50.0], vec![101.0, 50.0], vec![99.0, 50.0]]);
        let r = estimate_returns(&p, ReturnFrequency::Daily);
        match r {
            Err(RiskfrontError::DataError(msg)) => assert!(msg.contains("A1"), "{msg}"),
            other => panic!("expected DataError, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let p = prices(vec![vec![100.0], vec![0.0], vec![99.0]]);
        assert!(estimate_returns(&p, ReturnFrequency::Daily).is_err());
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Weekly".parse::<ReturnFrequency>().unwrap(), ReturnFrequency::Weekly);
        assert_eq!("m".parse::<ReturnFrequency>().unwrap(), ReturnFrequency::Monthly);
        assert!("hourly".parse::<ReturnFrequency>().is_err());
    }

    #[test]
    fn test_envelope_warns_on_short_history() {
        let p = prices(vec![vec![100.0], vec![101.0], vec![103.0], vec![102.0]]);
        let out = calculate_return_estimates(&EstimationInput {
            prices: p,
            frequency: ReturnFrequency::Daily,
        })
        .unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("noisy")));
    }

    #[test]
    fn test_deserialize_validates_rows() {
        let ok: ReturnSeries = serde_json::from_value(serde_json::json!({
            "assets": ["A", "B"],
            "returns": [[0.01, 0.02], [-0.01, 0.0]],
        }))
        .unwrap();
        assert_eq!(ok.n_periods(), 2);
        assert!(ok.dates().is_empty());

        let ragged: Result<ReturnSeries, _> = serde_json::from_value(serde_json::json!({
            "assets": ["A", "B"],
            "returns": [[0.01, 0.02], [-0.01]],
        }));
        assert!(ragged.is_err());
    }
}
