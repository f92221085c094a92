pub mod error;
pub mod types;

pub mod estimation;
pub mod market_data;

#[cfg(feature = "frontier")]
pub mod frontier;

#[cfg(feature = "hrp")]
pub mod hrp;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::RiskfrontError;
pub use types::*;

/// Standard result type for all riskfront operations
pub type RiskfrontResult<T> = Result<T, RiskfrontError>;
