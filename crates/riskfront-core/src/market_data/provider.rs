use crate::error::RiskfrontError;
use crate::market_data::price_series::{DateRange, PriceSeries};
use crate::RiskfrontResult;

/// Source of historical prices.
///
/// Implementations return `DataUnavailable` when nothing matches the
/// request; an empty series is never a valid answer.
pub trait PriceDataProvider {
    fn fetch_prices(&self, symbols: &[String], range: &DateRange) -> RiskfrontResult<PriceSeries>;
}

/// Serves sub-selections of a price table already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryPriceProvider {
    series: PriceSeries,
}

impl InMemoryPriceProvider {
    pub fn new(series: PriceSeries) -> Self {
        Self { series }
    }
}

impl PriceDataProvider for InMemoryPriceProvider {
    fn fetch_prices(&self, symbols: &[String], range: &DateRange) -> RiskfrontResult<PriceSeries> {
        let selected = self.series.select(symbols, range)?;
        if selected.is_empty() {
            return Err(RiskfrontError::DataUnavailable(format!(
                "No prices for {} between {} and {}",
                symbols.join(","),
                range.start,
                range.end
            )));
        }
        Ok(selected)
    }
}
