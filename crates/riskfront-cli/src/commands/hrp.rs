use clap::Args;
use serde_json::Value;

use riskfront_core::estimation::ReturnSeries;
use riskfront_core::frontier::simulation::default_risk_free_rate;
use riskfront_core::hrp::{run_hrp_allocation, HrpInput};

use super::{resolve_request, PriceArgs, Request};

/// Arguments for Hierarchical Risk Parity
#[derive(Args)]
pub struct HrpArgs {
    /// Path to JSON input file (returns or covariance matrix)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub source: PriceArgs,

    /// Annual risk-free rate for the reported Sharpe ratio
    #[arg(long, allow_hyphen_values = true)]
    pub risk_free_rate: Option<f64>,
}

pub fn run_hrp(args: HrpArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut hrp_input: HrpInput = match resolve_request(args.input.as_deref(), &args.source, "HRP")? {
        Request::Json(input) => input,
        Request::Prices(prices) => {
            let returns = ReturnSeries::from_prices(&prices)?;
            HrpInput {
                asset_names: returns.assets().to_vec(),
                returns: Some(returns.rows().to_vec()),
                covariance_matrix: None,
                mean_returns: None,
                frequency: args.source.frequency,
                risk_free_rate: default_risk_free_rate(),
            }
        }
    };
    if let Some(rf) = args.risk_free_rate {
        hrp_input.risk_free_rate = rf;
    }

    let result = run_hrp_allocation(&hrp_input)?;
    Ok(serde_json::to_value(result)?)
}
