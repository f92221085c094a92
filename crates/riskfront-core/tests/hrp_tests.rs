use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riskfront_core::estimation::ReturnSeries;
use riskfront_core::hrp::{
    correlation_distance, hrp_from_covariance, hrp_from_returns, quasi_diagonal_order,
    single_linkage, ClusterNode,
};
use riskfront_core::RiskfrontError;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn diag(vars: &[f64]) -> Vec<Vec<f64>> {
    (0..vars.len())
        .map(|i| {
            (0..vars.len())
                .map(|j| if i == j { vars[i] } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Two correlated blocks: assets 0, 2, 4 share one factor and 1, 3, 5 another.
fn block_returns(seed: u64, periods: usize) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows: Vec<Vec<f64>> = (0..periods)
        .map(|_| {
            let f1: f64 = rng.gen_range(-0.02..0.02);
            let f2: f64 = rng.gen_range(-0.02..0.02);
            (0..6)
                .map(|i| {
                    let factor = if i % 2 == 0 { f1 } else { f2 };
                    let scale = 1.0 + i as f64 * 0.25;
                    scale * (factor + rng.gen_range(-0.004..0.004))
                })
                .collect()
        })
        .collect();
    let names = (0..6).map(|i| format!("S{i}")).collect();
    ReturnSeries::new(names, Vec::new(), rows).unwrap()
}

fn assert_simplex(weights: &[f64]) {
    let total: f64 = weights.iter().sum();
    assert!((total - 1.0).abs() < 1e-9, "sum={total}");
    assert!(weights.iter().all(|w| *w > 0.0), "weights={weights:?}");
}

// ---------------------------------------------------------------------------
// Recursive bisection reference cases
// ---------------------------------------------------------------------------

#[test]
fn test_two_uncorrelated_assets() {
    // varLeft = 4, varRight = 1 -> alpha = 1 - 4/5 = 0.2
    let hrp = hrp_from_covariance(&diag(&[4.0, 1.0])).unwrap();
    assert!((hrp.weights[0] - 0.2).abs() < 1e-6, "w={:?}", hrp.weights);
    assert!((hrp.weights[1] - 0.8).abs() < 1e-6, "w={:?}", hrp.weights);
    assert!(hrp.weights[1] > 0.5);
}

#[test]
fn test_four_uncorrelated_equal_variance() {
    let hrp = hrp_from_covariance(&diag(&[1.0, 1.0, 1.0, 1.0])).unwrap();
    for w in &hrp.weights {
        assert!((w - 0.25).abs() < 1e-6, "w={:?}", hrp.weights);
    }
}

#[test]
fn test_four_orthogonal_return_columns() {
    // Walsh columns: zero mean, mutually orthogonal, equal variance.
    let walsh = [
        [1.0, 1.0, 1.0, 1.0],
        [1.0, 1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0, 1.0],
        [-1.0, 1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0, 1.0],
        [-1.0, -1.0, 1.0, 1.0],
        [-1.0, -1.0, -1.0, -1.0],
    ];
    let rows = walsh
        .iter()
        .map(|r| r.iter().map(|x| x * 0.01).collect())
        .collect();
    let names = vec!["A".into(), "B".into(), "C".into(), "D".into()];
    let returns = ReturnSeries::new(names, Vec::new(), rows).unwrap();
    let hrp = hrp_from_returns(&returns).unwrap();
    for w in &hrp.weights {
        assert!((w - 0.25).abs() < 1e-6, "w={:?}", hrp.weights);
    }
}

#[test]
fn test_lower_variance_gets_more_weight() {
    let hrp = hrp_from_covariance(&diag(&[0.09, 0.01, 0.04])).unwrap();
    assert!(hrp.weights[1] > hrp.weights[2]);
    assert!(hrp.weights[2] > hrp.weights[0]);
    assert_simplex(&hrp.weights);
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn test_weights_on_simplex_for_block_structure() {
    let returns = block_returns(7, 400);
    let hrp = hrp_from_returns(&returns).unwrap();
    assert_eq!(hrp.weights.len(), 6);
    assert_simplex(&hrp.weights);
}

#[test]
fn test_scale_invariance() {
    let returns = block_returns(11, 300);
    let cov = returns.covariance().unwrap();
    let base = hrp_from_covariance(&cov).unwrap();
    for k in [4.0, 3.7, 252.0] {
        let scaled: Vec<Vec<f64>> = cov
            .iter()
            .map(|row| row.iter().map(|c| c * k).collect())
            .collect();
        let hrp = hrp_from_covariance(&scaled).unwrap();
        assert_eq!(hrp.order, base.order);
        for (a, b) in hrp.weights.iter().zip(base.weights.iter()) {
            assert!((a - b).abs() < 1e-9, "k={k}: {a} vs {b}");
        }
    }
}

#[test]
fn test_order_groups_correlated_blocks() {
    let returns = block_returns(3, 500);
    let hrp = hrp_from_returns(&returns).unwrap();
    let first_half: Vec<usize> = hrp.order[..3].iter().map(|i| i % 2).collect();
    let second_half: Vec<usize> = hrp.order[3..].iter().map(|i| i % 2).collect();
    assert!(first_half.iter().all(|&p| p == first_half[0]), "order={:?}", hrp.order);
    assert!(second_half.iter().all(|&p| p == second_half[0]), "order={:?}", hrp.order);
    assert!(first_half[0] != second_half[0]);
}

#[test]
fn test_quasi_diagonal_is_permutation() {
    for n in 2..9 {
        let returns = {
            let mut rng = StdRng::seed_from_u64(n as u64);
            let rows = (0..120)
                .map(|_| (0..n).map(|_| rng.gen_range(-0.03..0.03)).collect())
                .collect();
            ReturnSeries::new((0..n).map(|i| format!("X{i}")).collect(), Vec::new(), rows)
                .unwrap()
        };
        let dist = correlation_distance(&returns.correlation().unwrap());
        let tree = single_linkage(&dist).unwrap();
        let mut order = quasi_diagonal_order(&tree).unwrap();
        order.sort_unstable();
        assert_eq!(order, (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn test_linkage_event_count_and_leaf_coverage() {
    let returns = block_returns(5, 250);
    let dist = correlation_distance(&returns.correlation().unwrap());
    let tree = single_linkage(&dist).unwrap();
    assert_eq!(tree.merges().len(), 5);

    let mut leaf_hits = vec![0usize; 6];
    for m in tree.merges() {
        for node in [m.left, m.right] {
            if let ClusterNode::Leaf(i) = node {
                leaf_hits[i] += 1;
            }
        }
    }
    assert_eq!(leaf_hits, vec![1; 6]);
    assert_eq!(tree.root().unwrap().size, 6);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_single_asset_is_clustering_error() {
    let returns =
        ReturnSeries::new(vec!["A".into()], Vec::new(), vec![vec![0.01], vec![0.02]]).unwrap();
    assert!(matches!(
        hrp_from_returns(&returns),
        Err(RiskfrontError::ClusteringError(_))
    ));
}

#[test]
fn test_constant_asset_is_data_error() {
    let rows = vec![vec![0.01, 0.0], vec![-0.02, 0.0], vec![0.03, 0.0]];
    let returns = ReturnSeries::new(vec!["A".into(), "FLAT".into()], Vec::new(), rows).unwrap();
    match hrp_from_returns(&returns) {
        Err(RiskfrontError::DataError(msg)) => assert!(msg.contains("FLAT"), "msg={msg}"),
        other => panic!("expected DataError, got {other:?}"),
    }
}
