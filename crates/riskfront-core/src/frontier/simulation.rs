use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;
use std::time::Instant;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::RiskfrontError;
use crate::estimation::matrix::validate_covariance_matrix;
use crate::estimation::{portfolio_performance, sharpe_ratio};
use crate::frontier::selectors::{max_sharpe_portfolio, min_volatility_portfolio};
use crate::types::{with_metadata, ComputationOutput, PortfolioPoint};
use crate::RiskfrontResult;

/// Number of excluded-trial messages copied into the output warnings.
const MAX_TRIAL_WARNINGS: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One Monte Carlo trial: the scored portfolio and the weights that made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Draw index within the run.
    pub trial: usize,
    pub volatility: f64,
    pub expected_return: f64,
    pub sharpe_ratio: f64,
    pub weights: Vec<f64>,
}

/// All records of a run in draw order, minus excluded trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierSimulation {
    pub records: Vec<SimulationRecord>,
    pub num_trials: usize,
    pub excluded_trials: usize,
    /// Reasons for the first few excluded trials.
    pub exclusion_reasons: Vec<String>,
}

impl FrontierSimulation {
    /// Generating weight vectors, index-aligned with `records`.
    pub fn weights(&self) -> Vec<&[f64]> {
        self.records.iter().map(|r| r.weights.as_slice()).collect()
    }

    /// Excluded-trial count followed by the recorded reasons; empty when
    /// every trial was kept.
    pub fn exclusion_warnings(&self) -> Vec<String> {
        if self.excluded_trials == 0 {
            return Vec::new();
        }
        let mut warnings = vec![format!(
            "{} of {} trials excluded (degenerate volatility)",
            self.excluded_trials, self.num_trials
        )];
        warnings.extend(self.exclusion_reasons.iter().cloned());
        warnings
    }
}

/// Input for a Monte Carlo efficient frontier run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierInput {
    /// Asset identifiers, same ordering as `mean_returns`.
    #[serde(default)]
    pub asset_names: Vec<String>,
    /// Annualized expected returns per asset.
    pub mean_returns: Vec<f64>,
    /// Annualized N x N covariance matrix.
    pub covariance_matrix: Vec<Vec<f64>>,
    /// Number of random portfolios.
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    /// Annual risk-free rate.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
    /// Return every simulation record, not just the selected portfolios.
    #[serde(default)]
    pub include_records: bool,
}

pub fn default_num_trials() -> u32 {
    20_000
}

pub fn default_risk_free_rate() -> f64 {
    0.02
}

/// Output of a Monte Carlo efficient frontier run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierOutput {
    pub num_trials: u32,
    pub valid_trials: u32,
    pub excluded_trials: u32,
    /// Highest Sharpe ratio portfolio.
    pub max_sharpe: PortfolioPoint,
    pub max_sharpe_trial: usize,
    /// Lowest volatility portfolio.
    pub min_volatility: PortfolioPoint,
    pub min_volatility_trial: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<SimulationRecord>>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Random long-only weights: N independent uniforms divided by their sum.
///
/// This is not uniform over the simplex; mass concentrates towards equal
/// weights as N grows.
fn draw_weights(rng: &mut StdRng, uniform: &Uniform, n: usize) -> RiskfrontResult<Vec<f64>> {
    let mut weights: Vec<f64> = (0..n).map(|_| rng.sample(uniform)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(RiskfrontError::NumericError(
            "Uniform draws summed to zero".into(),
        ));
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Ok(weights)
}

fn run_trial(
    trial: usize,
    seed: u64,
    uniform: &Uniform,
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
    risk_free_rate: f64,
) -> RiskfrontResult<SimulationRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights = draw_weights(&mut rng, uniform, mean_returns.len())?;
    let (expected_return, volatility) = portfolio_performance(&weights, mean_returns, covariance);
    let sharpe = sharpe_ratio(expected_return, risk_free_rate, volatility)?;
    Ok(SimulationRecord {
        trial,
        volatility,
        expected_return,
        sharpe_ratio: sharpe,
        weights,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score `num_trials` random portfolios against the given estimates.
///
/// The caller owns the generator. One per-trial seed is drawn from it for
/// every trial in order, and each trial samples from its own generator, so a
/// given seed reproduces the run exactly whether or not the `parallel`
/// feature spreads trials over threads.
///
/// A trial that hits a degenerate numeric condition is excluded and counted;
/// the run fails only when every trial was excluded.
pub fn simulate_efficient_frontier(
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
    num_trials: usize,
    risk_free_rate: f64,
    rng: &mut StdRng,
) -> RiskfrontResult<FrontierSimulation> {
    let n = mean_returns.len();
    if n == 0 {
        return Err(RiskfrontError::InvalidInput {
            field: "mean_returns".into(),
            reason: "At least one asset required".into(),
        });
    }
    validate_covariance_matrix(covariance, n)?;

    let uniform = Uniform::new(0.0, 1.0).map_err(|e| {
        RiskfrontError::NumericError(format!("Invalid uniform distribution: {e}"))
    })?;

    let seeds: Vec<u64> = (0..num_trials).map(|_| rng.gen()).collect();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<RiskfrontResult<SimulationRecord>> = seeds
        .par_iter()
        .enumerate()
        .map(|(trial, &seed)| {
            run_trial(trial, seed, &uniform, mean_returns, covariance, risk_free_rate)
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<RiskfrontResult<SimulationRecord>> = seeds
        .iter()
        .enumerate()
        .map(|(trial, &seed)| {
            run_trial(trial, seed, &uniform, mean_returns, covariance, risk_free_rate)
        })
        .collect();

    let mut records = Vec::with_capacity(num_trials);
    let mut excluded = 0usize;
    let mut exclusion_reasons = Vec::new();
    for (trial, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(record) => records.push(record),
            Err(e) => {
                excluded += 1;
                warn!(trial, error = %e, "excluding Monte Carlo trial");
                if exclusion_reasons.len() < MAX_TRIAL_WARNINGS {
                    exclusion_reasons.push(format!("trial {trial}: {e}"));
                }
            }
        }
    }

    if num_trials > 0 && records.is_empty() {
        return Err(RiskfrontError::NumericError(format!(
            "All {num_trials} Monte Carlo trials were excluded"
        )));
    }

    debug!(
        assets = n,
        trials = num_trials,
        excluded,
        "simulated efficient frontier"
    );

    Ok(FrontierSimulation {
        records,
        num_trials,
        excluded_trials: excluded,
        exclusion_reasons,
    })
}

/// Run the frontier simulation and select the max-Sharpe and
/// min-volatility portfolios.
pub fn run_frontier_simulation(
    input: &FrontierInput,
) -> RiskfrontResult<ComputationOutput<FrontierOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let n = input.mean_returns.len();
    let names = resolve_asset_names(&input.asset_names, n)?;

    if input.num_trials == 0 {
        return Err(RiskfrontError::InvalidInput {
            field: "num_trials".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let simulation = simulate_efficient_frontier(
        &input.mean_returns,
        &input.covariance_matrix,
        input.num_trials as usize,
        input.risk_free_rate,
        &mut rng,
    )?;

    let max_sharpe = max_sharpe_portfolio(&simulation.records)?;
    let min_vol = min_volatility_portfolio(&simulation.records)?;

    warnings.extend(simulation.exclusion_warnings());
    for (name, w) in names.iter().zip(max_sharpe.weights.iter()) {
        if *w > 0.40 {
            warnings.push(format!(
                "Concentrated position in max-Sharpe portfolio: {name} has weight {w:.4}"
            ));
        }
    }
    if input.seed.is_none() {
        warnings.push("No seed supplied; run is not reproducible".into());
    }

    let output = FrontierOutput {
        num_trials: input.num_trials,
        valid_trials: simulation.records.len() as u32,
        excluded_trials: simulation.excluded_trials as u32,
        max_sharpe: max_sharpe.to_point(&names),
        max_sharpe_trial: max_sharpe.trial,
        min_volatility: min_vol.to_point(&names),
        min_volatility_trial: min_vol.trial,
        records: if input.include_records {
            Some(simulation.records)
        } else {
            None
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo Efficient Frontier (normalized uniform weights)",
        &serde_json::json!({
            "n_assets": n,
            "num_trials": input.num_trials,
            "risk_free_rate": input.risk_free_rate,
            "seed": input.seed,
            "long_only": true,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Use the supplied names, or `Asset 1..N` when none were given.
pub(crate) fn resolve_asset_names(names: &[String], n: usize) -> RiskfrontResult<Vec<String>> {
    if names.is_empty() {
        return Ok((1..=n).map(|i| format!("Asset {i}")).collect());
    }
    if names.len() != n {
        return Err(RiskfrontError::InvalidInput {
            field: "asset_names".into(),
            reason: format!("Expected {} names but got {}", n, names.len()),
        });
    }
    Ok(names.to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
