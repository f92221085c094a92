use clap::Args;
use serde_json::Value;

use riskfront_core::comparison::{compare_allocations, ComparisonConfig, ComparisonInput};

use super::{resolve_request, PriceArgs, Request, SimulationArgs};

/// Arguments for the frontier vs HRP comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (prices plus run settings)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub source: PriceArgs,

    #[command(flatten)]
    pub sim: SimulationArgs,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut cmp_input: ComparisonInput =
        match resolve_request(args.input.as_deref(), &args.source, "the comparison")? {
            Request::Json(input) => input,
            Request::Prices(prices) => ComparisonInput {
                prices,
                config: ComparisonConfig {
                    frequency: args.source.frequency,
                    ..ComparisonConfig::default()
                },
            },
        };

    let config = &mut cmp_input.config;
    if let Some(trials) = args.sim.trials {
        config.num_trials = trials;
    }
    if let Some(seed) = args.sim.seed {
        config.seed = Some(seed);
    }
    if let Some(rf) = args.sim.risk_free_rate {
        config.risk_free_rate = rf;
    }
    config.include_records |= args.sim.include_records;

    let result = compare_allocations(&cmp_input)?;
    Ok(serde_json::to_value(result)?)
}
