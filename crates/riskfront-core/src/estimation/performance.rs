use crate::error::RiskfrontError;
use crate::estimation::matrix::{quadratic_form, vec_dot};
use crate::RiskfrontResult;

/// Expected return and volatility of a weighted portfolio.
///
/// Returns `(w·mu, sqrt(w'Σw))`. All three inputs must share one asset
/// ordering; lengths are not re-checked here. A quadratic form that rounds
/// slightly below zero is clamped so volatility is never negative.
pub fn portfolio_performance(
    weights: &[f64],
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
) -> (f64, f64) {
    debug_assert_eq!(weights.len(), mean_returns.len());
    debug_assert_eq!(weights.len(), covariance.len());

    let expected_return = vec_dot(weights, mean_returns);
    let variance = quadratic_form(weights, covariance);
    (expected_return, variance.max(0.0).sqrt())
}

/// Sharpe ratio: (return - rf) / volatility.
pub fn sharpe_ratio(expected_return: f64, risk_free_rate: f64, volatility: f64) -> RiskfrontResult<f64> {
    if volatility == 0.0 {
        return Err(RiskfrontError::NumericError(
            "Sharpe ratio undefined for zero volatility".into(),
        ));
    }
    let sharpe = (expected_return - risk_free_rate) / volatility;
    if !sharpe.is_finite() {
        return Err(RiskfrontError::NumericError(format!(
            "Non-finite Sharpe ratio (return={expected_return}, volatility={volatility})"
        )));
    }
    Ok(sharpe)
}
