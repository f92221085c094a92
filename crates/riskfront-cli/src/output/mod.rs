pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` of an output envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// `[{name, weight}, ...]` as `(name, weight)` pairs.
pub(crate) fn asset_weights(value: &Value) -> Option<Vec<(String, f64)>> {
    let arr = value.as_array().filter(|a| !a.is_empty())?;
    arr.iter()
        .map(|item| {
            let name = item.get("name")?.as_str()?.to_string();
            let weight = item.get("weight")?.as_f64()?;
            Some((name, weight))
        })
        .collect()
}

/// A portfolio on the volatility/return plane: has a Sharpe ratio and
/// labeled weights.
pub(crate) fn is_portfolio(value: &Value) -> bool {
    value.get("sharpe_ratio").is_some()
        && value.get("weights").and_then(asset_weights).is_some()
}
