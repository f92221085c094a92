pub mod price_series;
pub mod provider;

pub use price_series::{DateRange, PriceSeries};
pub use provider::{InMemoryPriceProvider, PriceDataProvider};
