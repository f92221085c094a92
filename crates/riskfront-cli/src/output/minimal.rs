use serde_json::Value;

use super::{asset_weights, result_of};

/// Print just the key answer from the output: the headline weights.
///
/// Looks for well-known result fields in order of priority, then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    let priority_keys = ["max_sharpe", "weights", "mean_returns"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    let weights = value
        .get("weights")
        .and_then(asset_weights)
        .or_else(|| asset_weights(value));
    if let Some(weights) = weights {
        return weights
            .iter()
            .map(|(name, w)| format!("{name}={w:.4}"))
            .collect::<Vec<_>>()
            .join(" ");
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
