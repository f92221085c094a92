//! Both allocation paths on one set of estimates, reported on the shared
//! volatility/return plane.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::error::RiskfrontError;
use crate::estimation::{
    estimate_returns, portfolio_performance, sharpe_ratio, ReturnEstimates, ReturnFrequency,
};
use crate::estimation::returns::history_warnings;
use crate::frontier::simulation::{default_num_trials, default_risk_free_rate};
use crate::frontier::{
    max_sharpe_portfolio, min_volatility_portfolio, simulate_efficient_frontier,
    SimulationRecord,
};
use crate::hrp::hrp_from_returns;
use crate::market_data::{DateRange, PriceDataProvider, PriceSeries};
use crate::types::{label_weights, with_metadata, ComputationOutput, PortfolioPoint};
use crate::RiskfrontResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Run parameters shared by both allocation paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub frequency: ReturnFrequency,
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    pub seed: Option<u64>,
    /// Keep every frontier record in the output (for scatter plots).
    #[serde(default)]
    pub include_records: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            frequency: ReturnFrequency::Daily,
            num_trials: default_num_trials(),
            risk_free_rate: default_risk_free_rate(),
            seed: None,
            include_records: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub prices: PriceSeries,
    #[serde(flatten)]
    pub config: ComparisonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub assets: Vec<String>,
    pub n_observations: usize,
    /// Annualized mean return per asset.
    pub mean_returns: Vec<f64>,
    /// Annualized covariance matrix.
    pub covariance: Vec<Vec<f64>>,
    pub max_sharpe: PortfolioPoint,
    pub min_volatility: PortfolioPoint,
    pub hrp: PortfolioPoint,
    /// Asset labels in HRP quasi-diagonal order.
    pub hrp_order: Vec<String>,
    pub valid_trials: u32,
    pub excluded_trials: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontier: Option<Vec<SimulationRecord>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate once, then run the Monte Carlo frontier and HRP side by side.
pub fn compare_allocations(
    input: &ComparisonInput,
) -> RiskfrontResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let config = &input.config;
    let estimates = estimate_returns(&input.prices, config.frequency)?;
    let mut warnings = history_warnings(&estimates);
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let output = compare_estimates(&estimates, config, &mut rng, &mut warnings)?;

    info!(
        assets = output.assets.len(),
        max_sharpe = ?output.max_sharpe.sharpe_ratio,
        hrp_sharpe = ?output.hrp.sharpe_ratio,
        "allocation comparison complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo Efficient Frontier vs Hierarchical Risk Parity",
        &serde_json::json!({
            "n_assets": output.assets.len(),
            "n_observations": output.n_observations,
            "frequency": config.frequency,
            "num_trials": config.num_trials,
            "risk_free_rate": config.risk_free_rate,
            "seed": config.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Fetch prices from a provider and compare allocations over them.
pub fn compare_from_provider(
    provider: &dyn PriceDataProvider,
    symbols: &[String],
    range: &DateRange,
    config: ComparisonConfig,
) -> RiskfrontResult<ComputationOutput<ComparisonOutput>> {
    let prices = provider.fetch_prices(symbols, range)?;
    compare_allocations(&ComparisonInput { prices, config })
}

fn compare_estimates(
    estimates: &ReturnEstimates,
    config: &ComparisonConfig,
    rng: &mut StdRng,
    warnings: &mut Vec<String>,
) -> RiskfrontResult<ComparisonOutput> {
    if config.num_trials == 0 {
        return Err(RiskfrontError::InvalidInput {
            field: "num_trials".into(),
            reason: "Must be at least 1".into(),
        });
    }
    let assets = estimates.assets().to_vec();
    let mu = &estimates.mean_returns;
    let cov = &estimates.covariance;

    let simulation = simulate_efficient_frontier(
        mu,
        cov,
        config.num_trials as usize,
        config.risk_free_rate,
        rng,
    )?;
    let max_sharpe = max_sharpe_portfolio(&simulation.records)?;
    let min_vol = min_volatility_portfolio(&simulation.records)?;
    warnings.extend(simulation.exclusion_warnings());

    let hrp = hrp_from_returns(&estimates.returns)?;
    let (hrp_return, hrp_vol) = portfolio_performance(&hrp.weights, mu, cov);
    let hrp_sharpe = match sharpe_ratio(hrp_return, config.risk_free_rate, hrp_vol) {
        Ok(s) => Some(s),
        Err(e) => {
            warnings.push(format!("HRP Sharpe ratio unavailable: {e}"));
            None
        }
    };

    if let Some(s) = hrp_sharpe.filter(|s| *s > max_sharpe.sharpe_ratio) {
        warnings.push(format!(
            "HRP Sharpe {s:.4} exceeds best sampled Sharpe {:.4}; consider more trials",
            max_sharpe.sharpe_ratio
        ));
    }

    Ok(ComparisonOutput {
        n_observations: estimates.returns.n_periods(),
        mean_returns: mu.clone(),
        covariance: cov.clone(),
        max_sharpe: max_sharpe.to_point(&assets),
        min_volatility: min_vol.to_point(&assets),
        hrp: PortfolioPoint {
            volatility: hrp_vol,
            expected_return: hrp_return,
            sharpe_ratio: hrp_sharpe,
            weights: label_weights(&assets, &hrp.weights),
        },
        hrp_order: hrp.order.iter().map(|&i| assets[i].clone()).collect(),
        valid_trials: simulation.records.len() as u32,
        excluded_trials: simulation.excluded_trials as u32,
        frontier: if config.include_records {
            Some(simulation.records)
        } else {
            None
        },
        assets,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
