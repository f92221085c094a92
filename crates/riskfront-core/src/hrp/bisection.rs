use tracing::debug;

use crate::error::RiskfrontError;
use crate::RiskfrontResult;

/// Inverse-variance weights over `members`, normalized to sum to 1.
pub fn inverse_variance_weights(cov: &[Vec<f64>], members: &[usize]) -> RiskfrontResult<Vec<f64>> {
    let mut inv_diag = Vec::with_capacity(members.len());
    for &i in members {
        let v = cov[i][i];
        if v.is_nan() || v <= 0.0 {
            return Err(RiskfrontError::NumericError(format!(
                "Asset {i} has non-positive variance {v}"
            )));
        }
        inv_diag.push(1.0 / v);
    }
    let total: f64 = inv_diag.iter().sum();
    Ok(inv_diag.into_iter().map(|x| x / total).collect())
}

/// Variance of a cluster held with inverse-variance weights.
pub fn cluster_variance(cov: &[Vec<f64>], members: &[usize]) -> RiskfrontResult<f64> {
    let w = inverse_variance_weights(cov, members)?;
    let mut var = 0.0;
    for (a, &i) in members.iter().enumerate() {
        for (b, &j) in members.iter().enumerate() {
            var += w[a] * cov[i][j] * w[b];
        }
    }
    Ok(var.max(0.0))
}

/// Top-down recursive bisection over a quasi-diagonal order.
///
/// Every asset starts at weight 1. Each round halves every group with more
/// than one member (left gets the first `len / 2`) and splits the parent's
/// weight between the halves in inverse proportion to their cluster
/// variance. The returned vector is indexed by original asset position, not
/// by position in `order`.
pub fn recursive_bisection(cov: &[Vec<f64>], order: &[usize]) -> RiskfrontResult<Vec<f64>> {
    let n = cov.len();
    if order.len() < 2 {
        return Err(RiskfrontError::ClusteringError(format!(
            "Recursive bisection needs at least 2 assets, got {}",
            order.len()
        )));
    }
    if let Some(&bad) = order.iter().find(|&&i| i >= n) {
        return Err(RiskfrontError::ClusteringError(format!(
            "Asset index {bad} out of range for {n}x{n} covariance"
        )));
    }

    let mut weights = vec![1.0; n];
    let mut groups: Vec<&[usize]> = vec![order];
    let mut round = 0usize;

    while !groups.is_empty() {
        let mut next: Vec<&[usize]> = Vec::with_capacity(groups.len() * 2);
        for group in groups {
            let (left, right) = group.split_at(group.len() / 2);

            let var_left = cluster_variance(cov, left)?;
            let var_right = cluster_variance(cov, right)?;
            let total = var_left + var_right;
            if total <= 0.0 || !total.is_finite() {
                return Err(RiskfrontError::NumericError(format!(
                    "Degenerate cluster variances {var_left} and {var_right}"
                )));
            }
            let alpha = 1.0 - var_left / total;

            for &i in left {
                weights[i] *= alpha;
            }
            for &i in right {
                weights[i] *= 1.0 - alpha;
            }

            next.extend([left, right].into_iter().filter(|g| g.len() > 1));
        }
        round += 1;
        groups = next;
    }

    debug!(assets = order.len(), rounds = round, "recursive bisection complete");
    Ok(weights)
}
