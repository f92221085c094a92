use clap::Args;
use serde_json::Value;

use riskfront_core::estimation::estimate_returns;
use riskfront_core::frontier::simulation::{default_num_trials, default_risk_free_rate};
use riskfront_core::frontier::{run_frontier_simulation, FrontierInput};

use super::{resolve_request, PriceArgs, Request, SimulationArgs};

/// Arguments for the Monte Carlo efficient frontier
#[derive(Args)]
pub struct FrontierArgs {
    /// Path to JSON input file (mean returns and covariance)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub source: PriceArgs,

    #[command(flatten)]
    pub sim: SimulationArgs,
}

pub fn run_frontier(args: FrontierArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut fr_input: FrontierInput =
        match resolve_request(args.input.as_deref(), &args.source, "the efficient frontier")? {
            Request::Json(input) => input,
            Request::Prices(prices) => {
                let estimates = estimate_returns(&prices, args.source.frequency)?;
                FrontierInput {
                    asset_names: estimates.assets().to_vec(),
                    mean_returns: estimates.mean_returns,
                    covariance_matrix: estimates.covariance,
                    num_trials: default_num_trials(),
                    risk_free_rate: default_risk_free_rate(),
                    seed: None,
                    include_records: false,
                }
            }
        };

    if let Some(trials) = args.sim.trials {
        fr_input.num_trials = trials;
    }
    if let Some(seed) = args.sim.seed {
        fr_input.seed = Some(seed);
    }
    if let Some(rf) = args.sim.risk_free_rate {
        fr_input.risk_free_rate = rf;
    }
    fr_input.include_records |= args.sim.include_records;

    let result = run_frontier_simulation(&fr_input)?;
    Ok(serde_json::to_value(result)?)
}
