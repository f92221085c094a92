use serde_json::Value;
use std::io;

use super::{asset_weights, result_of};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Frontier records become one row per simulated portfolio with a weight
/// column per asset; labeled weights become `name,weight` rows; anything
/// else is a two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    let records = result
        .get("records")
        .or_else(|| result.get("frontier"))
        .and_then(Value::as_array);

    if let Some(records) = records {
        write_records_csv(&mut wtr, records, &asset_names(result));
    } else if let Some(weights) = result.get("weights").and_then(asset_weights) {
        let _ = wtr.write_record(["asset", "weight"]);
        for (name, w) in weights {
            let _ = wtr.write_record([name, w.to_string()]);
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

/// Asset labels for weight columns, from `assets` or a selected portfolio.
fn asset_names(result: &Value) -> Vec<String> {
    if let Some(Value::Array(assets)) = result.get("assets") {
        return assets
            .iter()
            .filter_map(|a| a.as_str().map(str::to_string))
            .collect();
    }
    result
        .get("max_sharpe")
        .and_then(|p| p.get("weights"))
        .and_then(asset_weights)
        .map(|ws| ws.into_iter().map(|(name, _)| name).collect())
        .unwrap_or_default()
}

fn write_records_csv(wtr: &mut StdoutWriter<'_>, records: &[Value], names: &[String]) {
    let width = records
        .first()
        .and_then(|r| r.get("weights"))
        .and_then(Value::as_array)
        .map(|w| w.len())
        .unwrap_or(0);

    let mut header: Vec<String> = ["trial", "volatility", "expected_return", "sharpe_ratio"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for i in 0..width {
        match names.get(i) {
            Some(name) => header.push(format!("w_{name}")),
            None => header.push(format!("w_{i}")),
        }
    }
    let _ = wtr.write_record(&header);

    for record in records {
        let mut row: Vec<String> = ["trial", "volatility", "expected_return", "sharpe_ratio"]
            .iter()
            .map(|k| record.get(*k).map(format_csv_value).unwrap_or_default())
            .collect();
        if let Some(Value::Array(ws)) = record.get("weights") {
            row.extend(ws.iter().map(format_csv_value));
        }
        let _ = wtr.write_record(&row);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
