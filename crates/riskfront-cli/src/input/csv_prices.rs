use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

use riskfront_core::market_data::{DateRange, PriceDataProvider, PriceSeries};
use riskfront_core::{RiskfrontError, RiskfrontResult};

use super::file::read_text;

/// Column suffixes marking a dividend/split adjusted close.
const ADJUSTED_SUFFIXES: [&str; 6] = [
    " adj close",
    "_adj_close",
    " adj_close",
    " adjusted close",
    "_adjusted_close",
    ".adj_close",
];

/// Column suffixes marking a raw close.
const CLOSE_SUFFIXES: [&str; 3] = [" close", "_close", ".close"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceKind {
    Adjusted,
    Close,
}

/// Split a header into its symbol and price kind. Headers without a known
/// suffix are treated as a raw close for that symbol.
fn classify_header(header: &str) -> (String, PriceKind) {
    let trimmed = header.trim();
    let lower = trimmed.to_ascii_lowercase();
    for suffix in ADJUSTED_SUFFIXES {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            let symbol = &trimmed[..trimmed.len() - suffix.len()];
            return (symbol.trim().to_string(), PriceKind::Adjusted);
        }
    }
    for suffix in CLOSE_SUFFIXES {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            let symbol = &trimmed[..trimmed.len() - suffix.len()];
            return (symbol.trim().to_string(), PriceKind::Close);
        }
    }
    (trimmed.to_string(), PriceKind::Close)
}

/// Wide price table read from CSV: a date column followed by one column
/// per symbol.
pub struct CsvPriceProvider {
    contents: String,
}

impl CsvPriceProvider {
    pub fn open(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            contents: read_text(path)?,
        })
    }

    #[cfg(test)]
    fn from_text(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Symbols in file order, one per symbol even when both close variants
    /// are present.
    pub fn symbols(&self) -> RiskfrontResult<Vec<String>> {
        let columns = self.columns()?;
        let mut out: Vec<String> = Vec::new();
        for (symbol, _) in columns.into_iter().skip(1) {
            if !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        Ok(out)
    }

    fn reader(&self) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(self.contents.as_bytes())
    }

    fn columns(&self) -> RiskfrontResult<Vec<(String, PriceKind)>> {
        let mut rdr = self.reader();
        let headers = rdr.headers().map_err(csv_error)?;
        if headers.len() < 2 {
            return Err(RiskfrontError::DataError(
                "Price CSV needs a date column and at least one symbol column".into(),
            ));
        }
        Ok(headers.iter().map(classify_header).collect())
    }

    /// Column index for each requested symbol, adjusted close first.
    fn resolve_columns(&self, symbols: &[String]) -> RiskfrontResult<Vec<usize>> {
        let columns = self.columns()?;
        let mut by_symbol: HashMap<&str, (Option<usize>, Option<usize>)> = HashMap::new();
        for (idx, (symbol, kind)) in columns.iter().enumerate().skip(1) {
            let entry = by_symbol.entry(symbol.as_str()).or_default();
            match kind {
                PriceKind::Adjusted => entry.0 = entry.0.or(Some(idx)),
                PriceKind::Close => entry.1 = entry.1.or(Some(idx)),
            }
        }
        symbols
            .iter()
            .map(|s| match by_symbol.get(s.as_str()) {
                Some((Some(adj), _)) => Ok(*adj),
                Some((None, Some(close))) => Ok(*close),
                _ => Err(RiskfrontError::DataUnavailable(format!(
                    "No price column for symbol '{s}'"
                ))),
            })
            .collect()
    }
}

impl PriceDataProvider for CsvPriceProvider {
    fn fetch_prices(&self, symbols: &[String], range: &DateRange) -> RiskfrontResult<PriceSeries> {
        if symbols.is_empty() {
            return Err(RiskfrontError::InvalidInput {
                field: "symbols".into(),
                reason: "At least one symbol required".into(),
            });
        }
        let indices = self.resolve_columns(symbols)?;

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        let mut dropped = 0usize;
        for (line, record) in self.reader().records().enumerate() {
            let record = record.map_err(csv_error)?;
            let raw_date = record.get(0).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| {
                RiskfrontError::DataError(format!(
                    "Row {}: unparsable date '{raw_date}'",
                    line + 2
                ))
            })?;
            if !range.contains(date) {
                continue;
            }

            let prices: Option<Vec<f64>> = indices
                .iter()
                .map(|&i| {
                    record
                        .get(i)
                        .and_then(|v| v.parse::<f64>().ok())
                        .filter(|p| p.is_finite())
                })
                .collect();
            match prices {
                Some(p) => rows.push((date, p)),
                None => {
                    dropped += 1;
                    warn!(%date, "dropping price row with a missing value");
                }
            }
        }

        if rows.is_empty() {
            return Err(RiskfrontError::DataUnavailable(format!(
                "No complete price rows for {} between {} and {}",
                symbols.join(","),
                range.start,
                range.end
            )));
        }

        rows.sort_by_key(|(d, _)| *d);
        debug!(rows = rows.len(), dropped, "loaded CSV prices");

        let (dates, prices): (Vec<NaiveDate>, Vec<Vec<f64>>) = rows.into_iter().unzip();
        PriceSeries::new(symbols.to_vec(), dates, prices)
    }
}

/// ISO dates, tolerating a trailing time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn csv_error(e: csv::Error) -> RiskfrontError {
    RiskfrontError::DataError(format!("CSV error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Date,AAA Close,AAA Adj Close,BBB
2024-01-02,10.0,9.0,50.0
2024-01-03,11.0,9.9,
2024-01-04,12.0,10.8,52.0
2024-01-05,12.5,11.25,53.0
";

    fn all_time() -> DateRange {
        DateRange::new(NaiveDate::MIN, NaiveDate::MAX).unwrap()
    }

    fn names(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_header() {
        assert_eq!(classify_header("SPY Adj Close"), ("SPY".into(), PriceKind::Adjusted));
        assert_eq!(classify_header("spy_adj_close"), ("spy".into(), PriceKind::Adjusted));
        assert_eq!(classify_header("SPY Close"), ("SPY".into(), PriceKind::Close));
        assert_eq!(classify_header(" BRK.B "), ("BRK.B".into(), PriceKind::Close));
    }

    #[test]
    fn test_symbols_deduplicated() {
        let provider = CsvPriceProvider::from_text(SAMPLE);
        assert_eq!(provider.symbols().unwrap(), names(&["AAA", "BBB"]));
    }

    #[test]
    fn test_adjusted_close_preferred() {
        let provider = CsvPriceProvider::from_text(SAMPLE);
        let series = provider.fetch_prices(&names(&["AAA"]), &all_time()).unwrap();
        let col: Vec<f64> = series.rows().iter().map(|r| r[0]).collect();
        assert_eq!(col, vec![9.0, 9.9, 10.8, 11.25]);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let provider = CsvPriceProvider::from_text(SAMPLE);
        let series = provider
            .fetch_prices(&names(&["AAA", "BBB"]), &all_time())
            .unwrap();
        assert_eq!(series.n_periods(), 3);
        assert_eq!(series.dates()[1], NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_range_filter() {
        let provider = CsvPriceProvider::from_text(SAMPLE);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        )
        .unwrap();
        let series = provider.fetch_prices(&names(&["AAA"]), &range).unwrap();
        assert_eq!(series.n_periods(), 2);
    }

    #[test]
    fn test_unknown_symbol_unavailable() {
        let provider = CsvPriceProvider::from_text(SAMPLE);
        let r = provider.fetch_prices(&names(&["ZZZ"]), &all_time());
        assert!(matches!(r, Err(RiskfrontError::DataUnavailable(_))));
    }

    #[test]
    fn test_unsorted_rows_are_ordered() {
        let text = "date,X\n2024-02-02,3.0\n2024-02-01,2.0\n2024-01-31,1.0\n";
        let provider = CsvPriceProvider::from_text(text);
        let series = provider.fetch_prices(&names(&["X"]), &all_time()).unwrap();
        let col: Vec<f64> = series.rows().iter().map(|r| r[0]).collect();
        assert_eq!(col, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bad_date_is_data_error() {
        let provider = CsvPriceProvider::from_text("date,X\nnot-a-date,1.0\n");
        let r = provider.fetch_prices(&names(&["X"]), &all_time());
        assert!(matches!(r, Err(RiskfrontError::DataError(_))));
    }
}
