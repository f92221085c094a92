use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RiskfrontError;
use crate::estimation::matrix::{cov_to_corr, validate_covariance_matrix};
use crate::estimation::{portfolio_performance, sharpe_ratio, ReturnFrequency, ReturnSeries};
use crate::hrp::bisection::recursive_bisection;
use crate::hrp::distance::correlation_distance;
use crate::hrp::linkage::{single_linkage, ClusterTree};
use crate::hrp::quasi_diag::quasi_diagonal_order;
use crate::types::{label_weights, with_metadata, AssetWeight, ComputationOutput};
use crate::RiskfrontResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of the four HRP stages, indexed by original asset position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpAllocation {
    pub weights: Vec<f64>,
    /// Quasi-diagonal order used for bisection.
    pub order: Vec<usize>,
    pub tree: ClusterTree,
}

/// Input for an HRP allocation. Supply either a return table or a
/// covariance matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpInput {
    #[serde(default)]
    pub asset_names: Vec<String>,
    /// Periodic returns, one row per period and one column per asset.
    pub returns: Option<Vec<Vec<f64>>>,
    /// Covariance matrix, used when `returns` is absent.
    pub covariance_matrix: Option<Vec<Vec<f64>>>,
    /// Annualized expected returns, used to place the portfolio on the
    /// risk/return plane when only a covariance matrix is given.
    pub mean_returns: Option<Vec<f64>>,
    /// Frequency of `returns`, for annualizing the performance figures.
    #[serde(default)]
    pub frequency: ReturnFrequency,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

fn default_risk_free_rate() -> f64 {
    0.02
}

/// Annualized performance of the HRP portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpPerformance {
    pub expected_return: f64,
    pub volatility: f64,
    /// `None` when the weights cancel to a zero-volatility portfolio.
    pub sharpe_ratio: Option<f64>,
}

/// Output of an HRP allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpOutput {
    /// Weights in original asset order.
    pub weights: Vec<AssetWeight>,
    /// Asset labels in quasi-diagonal order.
    pub ordered_assets: Vec<String>,
    pub ordered_indices: Vec<usize>,
    pub linkage: ClusterTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<HrpPerformance>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn allocate(corr: &[Vec<f64>], cov: &[Vec<f64>]) -> RiskfrontResult<HrpAllocation> {
    let distance = correlation_distance(corr);
    let tree = single_linkage(&distance)?;
    let order = quasi_diagonal_order(&tree)?;
    let weights = recursive_bisection(cov, &order)?;
    Ok(HrpAllocation {
        weights,
        order,
        tree,
    })
}

fn ensure_enough_assets(n: usize) -> RiskfrontResult<()> {
    if n < 2 {
        return Err(RiskfrontError::ClusteringError(format!(
            "HRP needs at least 2 assets, got {n}"
        )));
    }
    Ok(())
}

/// HRP weights from a return table. Correlation and covariance are both
/// estimated from `returns`.
pub fn hrp_from_returns(returns: &ReturnSeries) -> RiskfrontResult<HrpAllocation> {
    ensure_enough_assets(returns.n_assets())?;
    let cov = returns.covariance()?;
    for (i, asset) in returns.assets().iter().enumerate() {
        let v = cov[i][i];
        if v.is_nan() || v <= 0.0 {
            return Err(RiskfrontError::DataError(format!(
                "Returns of {asset} have zero variance"
            )));
        }
    }
    let corr = cov_to_corr(&cov)?;
    allocate(&corr, &cov)
}

/// HRP weights from a covariance matrix alone.
///
/// Multiplying `cov` by a positive constant leaves the weights unchanged.
pub fn hrp_from_covariance(cov: &[Vec<f64>]) -> RiskfrontResult<HrpAllocation> {
    ensure_enough_assets(cov.len())?;
    validate_covariance_matrix(cov, cov.len())?;
    let corr = cov_to_corr(cov)?;
    allocate(&corr, cov)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run Hierarchical Risk Parity and report labeled weights, the
/// quasi-diagonal order and the linkage tree.
pub fn run_hrp_allocation(input: &HrpInput) -> RiskfrontResult<ComputationOutput<HrpOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (allocation, n, source, plane) = match (&input.returns, &input.covariance_matrix) {
        (Some(rows), _) => {
            let n = rows.first().map(|r| r.len()).unwrap_or(0);
            let names = placeholder_names(&input.asset_names, n);
            let returns = ReturnSeries::new(names, Vec::new(), rows.clone())?;
            let allocation = hrp_from_returns(&returns)?;
            let periods = input.frequency.periods_per_year();
            let mu: Vec<f64> = returns.mean().iter().map(|m| m * periods).collect();
            let cov: Vec<Vec<f64>> = returns
                .covariance()?
                .into_iter()
                .map(|row| row.into_iter().map(|c| c * periods).collect())
                .collect();
            if input.covariance_matrix.is_some() {
                warnings.push("Both returns and covariance supplied; covariance ignored".into());
            }
            (allocation, n, "returns", Some((mu, cov)))
        }
        (None, Some(cov)) => {
            let allocation = hrp_from_covariance(cov)?;
            let plane = match &input.mean_returns {
                Some(mu) if mu.len() == cov.len() => Some((mu.clone(), cov.clone())),
                Some(mu) => {
                    return Err(RiskfrontError::InvalidInput {
                        field: "mean_returns".into(),
                        reason: format!("Expected {} values but got {}", cov.len(), mu.len()),
                    })
                }
                None => None,
            };
            (allocation, cov.len(), "covariance_matrix", plane)
        }
        (None, None) => {
            return Err(RiskfrontError::InvalidInput {
                field: "returns".into(),
                reason: "Either returns or covariance_matrix is required".into(),
            })
        }
    };

    let names = if input.asset_names.is_empty() {
        placeholder_names(&input.asset_names, n)
    } else if input.asset_names.len() == n {
        input.asset_names.clone()
    } else {
        return Err(RiskfrontError::InvalidInput {
            field: "asset_names".into(),
            reason: format!("Expected {} names but got {}", n, input.asset_names.len()),
        });
    };

    let performance = match plane {
        Some((mu, cov)) => {
            let (expected_return, volatility) =
                portfolio_performance(&allocation.weights, &mu, &cov);
            let sharpe = match sharpe_ratio(expected_return, input.risk_free_rate, volatility) {
                Ok(s) => Some(s),
                Err(e) => {
                    warnings.push(format!("HRP Sharpe ratio unavailable: {e}"));
                    None
                }
            };
            Some(HrpPerformance {
                expected_return,
                volatility,
                sharpe_ratio: sharpe,
            })
        }
        None => None,
    };

    for (name, w) in names.iter().zip(allocation.weights.iter()) {
        if *w > 0.40 {
            warnings.push(format!("Concentrated position: {name} has weight {w:.4}"));
        }
    }

    let output = HrpOutput {
        weights: label_weights(&names, &allocation.weights),
        ordered_assets: allocation.order.iter().map(|&i| names[i].clone()).collect(),
        ordered_indices: allocation.order,
        linkage: allocation.tree,
        performance,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Hierarchical Risk Parity (single linkage, recursive bisection)",
        &serde_json::json!({
            "n_assets": n,
            "source": source,
            "distance": "sqrt(0.5 * (1 - corr))",
            "linkage": "single",
            "risk_free_rate": input.risk_free_rate,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn placeholder_names(names: &[String], n: usize) -> Vec<String> {
    if names.len() == n {
        names.to_vec()
    } else {
        (1..=n).map(|i| format!("Asset {i}")).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
