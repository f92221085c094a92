use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use riskfront_core::estimation::portfolio_performance;
use riskfront_core::frontier::{
    max_sharpe_portfolio, min_volatility_portfolio, run_frontier_simulation,
    simulate_efficient_frontier, FrontierInput,
};
use riskfront_core::RiskfrontError;

fn three_asset_input(seed: Option<u64>) -> FrontierInput {
    FrontierInput {
        asset_names: vec!["EQ".into(), "BOND".into(), "GOLD".into()],
        mean_returns: vec![0.10, 0.04, 0.06],
        covariance_matrix: vec![
            vec![0.0400, 0.0020, 0.0010],
            vec![0.0020, 0.0025, 0.0005],
            vec![0.0010, 0.0005, 0.0225],
        ],
        num_trials: 2_000,
        risk_free_rate: 0.02,
        seed,
        include_records: true,
    }
}

#[test]
fn test_seed_reproduces_run_exactly() {
    let a = run_frontier_simulation(&three_asset_input(Some(42))).unwrap();
    let b = run_frontier_simulation(&three_asset_input(Some(42))).unwrap();
    assert_eq!(a.result.records, b.result.records);
    assert_eq!(a.result.max_sharpe_trial, b.result.max_sharpe_trial);
    assert_eq!(a.result.min_volatility_trial, b.result.min_volatility_trial);
}

#[test]
fn test_different_seeds_differ() {
    let a = run_frontier_simulation(&three_asset_input(Some(1))).unwrap();
    let b = run_frontier_simulation(&three_asset_input(Some(2))).unwrap();
    assert!(a.result.records != b.result.records);
}

#[test]
fn test_every_record_is_long_only_and_fully_invested() {
    let out = run_frontier_simulation(&three_asset_input(Some(9))).unwrap();
    let records = out.result.records.unwrap();
    assert_eq!(records.len(), 2_000);
    for r in &records {
        let total: f64 = r.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(r.weights.iter().all(|w| (0.0..=1.0).contains(w)));
        assert!(r.volatility >= 0.0);
    }
}

#[test]
fn test_records_match_their_weights() {
    let input = three_asset_input(Some(17));
    let mut rng = StdRng::seed_from_u64(17);
    let sim = simulate_efficient_frontier(
        &input.mean_returns,
        &input.covariance_matrix,
        500,
        input.risk_free_rate,
        &mut rng,
    )
    .unwrap();
    assert_eq!(sim.weights().len(), sim.records.len());
    for r in &sim.records {
        let (ret, vol) = portfolio_performance(&r.weights, &input.mean_returns, &input.covariance_matrix);
        assert!((ret - r.expected_return).abs() < 1e-12);
        assert!((vol - r.volatility).abs() < 1e-12);
        assert!((r.sharpe_ratio - (ret - 0.02) / vol).abs() < 1e-9);
    }
}

#[test]
fn test_selectors_are_extremes() {
    let out = run_frontier_simulation(&three_asset_input(Some(5))).unwrap();
    let records = out.result.records.clone().unwrap();
    let best = max_sharpe_portfolio(&records).unwrap();
    let calm = min_volatility_portfolio(&records).unwrap();
    for r in &records {
        assert!(best.sharpe_ratio >= r.sharpe_ratio);
        assert!(calm.volatility <= r.volatility);
    }
    assert_eq!(best.trial, out.result.max_sharpe_trial);
    assert_eq!(calm.trial, out.result.min_volatility_trial);
    assert!(calm.volatility <= best.volatility);
}

#[test]
fn test_min_volatility_leans_on_low_variance_asset() {
    let out = run_frontier_simulation(&three_asset_input(Some(23))).unwrap();
    let calm = &out.result.min_volatility;
    let bond = calm.weights.iter().find(|w| w.name == "BOND").unwrap();
    assert!(bond.weight > 0.5, "weights={:?}", calm.weights);
}

#[test]
fn test_single_asset_always_fully_invested() {
    let input = FrontierInput {
        asset_names: vec!["ONLY".into()],
        mean_returns: vec![0.07],
        covariance_matrix: vec![vec![0.04]],
        num_trials: 50,
        risk_free_rate: 0.01,
        seed: Some(3),
        include_records: true,
    };
    let out = run_frontier_simulation(&input).unwrap();
    for r in out.result.records.unwrap() {
        assert!((r.weights[0] - 1.0).abs() < 1e-12);
        assert!((r.volatility - 0.2).abs() < 1e-12);
        assert!((r.sharpe_ratio - 0.3).abs() < 1e-9);
    }
}

#[test]
fn test_zero_covariance_excludes_every_trial() {
    let mut input = three_asset_input(Some(1));
    input.covariance_matrix = vec![vec![0.0; 3]; 3];
    input.num_trials = 10;
    assert!(matches!(
        run_frontier_simulation(&input),
        Err(RiskfrontError::NumericError(_))
    ));
}

#[test]
fn test_zero_trials_rejected() {
    let mut input = three_asset_input(Some(1));
    input.num_trials = 0;
    assert!(matches!(
        run_frontier_simulation(&input),
        Err(RiskfrontError::InvalidInput { .. })
    ));
}

#[test]
fn test_envelope_metadata() {
    let out = run_frontier_simulation(&three_asset_input(Some(1))).unwrap();
    assert_eq!(out.metadata.precision, "ieee754_f64");
    assert!(out.methodology.contains("Monte Carlo"));
    let json = serde_json::to_value(&out).unwrap();
    assert!(json["result"]["max_sharpe"]["weights"].is_array());
}
