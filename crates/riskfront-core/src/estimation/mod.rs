pub mod matrix;
pub mod performance;
pub mod returns;

pub use performance::{portfolio_performance, sharpe_ratio};
pub use returns::{
    calculate_return_estimates, estimate_returns, EstimationInput, ReturnEstimates,
    ReturnFrequency, ReturnSeries,
};
