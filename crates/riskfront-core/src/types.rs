use serde::{Deserialize, Serialize};

/// Annualized rates and returns expressed as decimals (0.05 = 5%).
pub type Rate = f64;

/// One weight per asset, in the asset ordering of the estimates it was built from.
pub type WeightVector = Vec<f64>;

/// A single asset weight, labeled at the output boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    pub name: String,
    pub weight: f64,
}

/// Attach asset labels to a weight vector. Both slices share one ordering.
pub fn label_weights(names: &[String], weights: &[f64]) -> Vec<AssetWeight> {
    names
        .iter()
        .zip(weights.iter())
        .map(|(name, &weight)| AssetWeight {
            name: name.clone(),
            weight,
        })
        .collect()
}

/// A portfolio placed on the shared volatility/return plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub volatility: f64,
    pub expected_return: f64,
    /// `None` when the portfolio has zero volatility.
    pub sharpe_ratio: Option<f64>,
    pub weights: Vec<AssetWeight>,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}
