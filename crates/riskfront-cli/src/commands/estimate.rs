use clap::Args;
use serde_json::Value;

use riskfront_core::estimation::{calculate_return_estimates, EstimationInput};

use super::{resolve_request, PriceArgs, Request};

/// Arguments for mean/covariance estimation
#[derive(Args)]
pub struct EstimateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub source: PriceArgs,
}

pub fn run_estimate(args: EstimateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let est_input = match resolve_request(args.input.as_deref(), &args.source, "estimation")? {
        Request::Json(input) => input,
        Request::Prices(prices) => EstimationInput {
            prices,
            frequency: args.source.frequency,
        },
    };
    let result = calculate_return_estimates(&est_input)?;
    Ok(serde_json::to_value(result)?)
}
