use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{asset_weights, is_portfolio};

/// Fields too bulky for a table cell; shown as an entry count.
const SUMMARIZED_FIELDS: [&str; 5] = ["records", "frontier", "covariance", "linkage", "returns"];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_tables(result, map),
            _ => print_fields(map),
        },
        _ => println!("{value}"),
    }
}

fn print_result_tables(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut scalars = Map::new();
    let mut portfolios: Vec<(&str, &Value)> = Vec::new();
    let mut weight_lists: Vec<(&str, Vec<(String, f64)>)> = Vec::new();

    for (key, val) in result {
        if is_portfolio(val) {
            portfolios.push((key.as_str(), val));
        } else if let Some(ws) = asset_weights(val) {
            weight_lists.push((key.as_str(), ws));
        } else {
            scalars.insert(key.clone(), val.clone());
        }
    }

    print_fields(&scalars);
    if !portfolios.is_empty() {
        println!();
        print_portfolios(&portfolios);
    }
    for (key, ws) in weight_lists {
        println!("\n{key}:");
        let mut builder = Builder::default();
        builder.push_record(["Asset", "Weight"]);
        for (name, w) in ws {
            builder.push_record([name, format!("{w:.4}")]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

/// One row per portfolio, one weight column per asset.
fn print_portfolios(portfolios: &[(&str, &Value)]) {
    let names: Vec<String> = portfolios
        .first()
        .and_then(|(_, p)| p.get("weights"))
        .and_then(asset_weights)
        .map(|ws| ws.into_iter().map(|(n, _)| n).collect())
        .unwrap_or_default();

    let mut header = vec![
        "Portfolio".to_string(),
        "Volatility".to_string(),
        "Return".to_string(),
        "Sharpe".to_string(),
    ];
    header.extend(names.iter().cloned());

    let mut builder = Builder::default();
    builder.push_record(header);
    for (label, p) in portfolios {
        let mut row = vec![
            label.to_string(),
            format_number(p.get("volatility")),
            format_number(p.get("expected_return")),
            format_number(p.get("sharpe_ratio")),
        ];
        if let Some(ws) = p.get("weights").and_then(asset_weights) {
            row.extend(ws.into_iter().map(|(_, w)| format!("{w:.4}")));
        }
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        let cell = if SUMMARIZED_FIELDS.contains(&key.as_str()) {
            summarize(val)
        } else {
            format_value(val)
        };
        builder.push_record([key.as_str(), &cell]);
    }
    println!("{}", Table::from(builder));
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Array(arr) => format!("({} entries)", arr.len()),
        Value::Object(map) => match map.get("merges").and_then(Value::as_array) {
            Some(merges) => format!("({} merges)", merges.len()),
            None => format!("({} fields)", map.len()),
        },
        other => format_value(other),
    }
}

fn format_number(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(x) => format!("{x:.4}"),
        None => String::new(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
