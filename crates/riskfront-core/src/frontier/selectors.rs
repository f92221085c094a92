use serde::{Deserialize, Serialize};

use crate::error::RiskfrontError;
use crate::frontier::simulation::SimulationRecord;
use crate::types::{label_weights, PortfolioPoint};
use crate::RiskfrontResult;

/// A record picked out of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPortfolio {
    /// Draw index of the generating trial.
    pub trial: usize,
    pub volatility: f64,
    pub expected_return: f64,
    pub sharpe_ratio: f64,
    pub weights: Vec<f64>,
}

impl SelectedPortfolio {
    fn from_record(record: &SimulationRecord) -> Self {
        Self {
            trial: record.trial,
            volatility: record.volatility,
            expected_return: record.expected_return,
            sharpe_ratio: record.sharpe_ratio,
            weights: record.weights.clone(),
        }
    }

    /// Place the portfolio on the volatility/return plane with asset labels.
    pub fn to_point(&self, asset_names: &[String]) -> PortfolioPoint {
        PortfolioPoint {
            volatility: self.volatility,
            expected_return: self.expected_return,
            sharpe_ratio: Some(self.sharpe_ratio),
            weights: label_weights(asset_names, &self.weights),
        }
    }
}

/// Record with the highest Sharpe ratio. Ties keep the earliest draw.
pub fn max_sharpe_portfolio(records: &[SimulationRecord]) -> RiskfrontResult<SelectedPortfolio> {
    select_first_best(records, "max_sharpe", |candidate, best| {
        candidate.sharpe_ratio > best.sharpe_ratio
    })
}

/// Record with the lowest volatility. Ties keep the earliest draw.
pub fn min_volatility_portfolio(records: &[SimulationRecord]) -> RiskfrontResult<SelectedPortfolio> {
    select_first_best(records, "min_volatility", |candidate, best| {
        candidate.volatility < best.volatility
    })
}

fn select_first_best<F>(
    records: &[SimulationRecord],
    selector: &str,
    is_better: F,
) -> RiskfrontResult<SelectedPortfolio>
where
    F: Fn(&SimulationRecord, &SimulationRecord) -> bool,
{
    let (first, rest) = records.split_first().ok_or_else(|| {
        RiskfrontError::EmptyInput(format!("{selector} selector called with zero simulation records"))
    })?;

    let best = rest.iter().fold(first, |best, candidate| {
        if is_better(candidate, best) {
            candidate
        } else {
            best
        }
    });

    Ok(SelectedPortfolio::from_record(best))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(trial: usize, volatility: f64, expected_return: f64, sharpe_ratio: f64) -> SimulationRecord {
        SimulationRecord {
            trial,
            volatility,
            expected_return,
            sharpe_ratio,
            weights: vec![trial as f64, 1.0 - trial as f64],
        }
    }

    #[test]
    fn test_empty_records() {
        assert!(matches!(
            max_sharpe_portfolio(&[]),
            Err(RiskfrontError::EmptyInput(_))
        ));
        assert!(matches!(
            min_volatility_portfolio(&[]),
            Err(RiskfrontError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_max_sharpe_picks_highest() {
        let records = vec![rec(0, 0.2, 0.1, 0.4), rec(1, 0.3, 0.2, 0.6), rec(2, 0.1, 0.05, 0.3)];
        let best = max_sharpe_portfolio(&records).unwrap();
        assert_eq!(best.trial, 1);
        assert_eq!(best.volatility, 0.3);
        assert_eq!(best.expected_return, 0.2);
    }

    #[test]
    fn test_min_volatility_picks_lowest() {
        let records = vec![rec(0, 0.2, 0.1, 0.4), rec(1, 0.3, 0.2, 0.6), rec(2, 0.1, 0.05, 0.3)];
        let best = min_volatility_portfolio(&records).unwrap();
        assert_eq!(best.trial, 2);
        assert_eq!(best.weights, vec![2.0, -1.0]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let records = vec![rec(0, 0.3, 0.1, 0.5), rec(1, 0.1, 0.1, 0.5), rec(2, 0.1, 0.1, 0.5)];
        assert_eq!(max_sharpe_portfolio(&records).unwrap().trial, 0);
        assert_eq!(min_volatility_portfolio(&records).unwrap().trial, 1);
    }

    #[test]
    fn test_to_point_labels() {
        let p = max_sharpe_portfolio(&[rec(0, 0.2, 0.1, 0.4)])
            .unwrap()
            .to_point(&["X".into(), "Y".into()]);
        assert_eq!(p.weights[1].name, "Y");
        assert_eq!(p.sharpe_ratio, Some(0.4));
    }
}
