//! Small dense-matrix helpers over `Vec<Vec<f64>>` rows.

use crate::error::RiskfrontError;
use crate::RiskfrontResult;

/// Dot product.
pub fn vec_dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Matrix-vector multiplication.
pub fn mat_vec_multiply(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    mat.iter().map(|row| vec_dot(row, v)).collect()
}

/// w' * Sigma * w
pub fn quadratic_form(w: &[f64], sigma: &[Vec<f64>]) -> f64 {
    vec_dot(w, &mat_vec_multiply(sigma, w))
}

/// Column means of a row-major table.
pub fn column_means(rows: &[Vec<f64>], n_cols: usize) -> Vec<f64> {
    let t = rows.len() as f64;
    (0..n_cols)
        .map(|c| rows.iter().map(|r| r[c]).sum::<f64>() / t)
        .collect()
}

/// Sample covariance (denominator n - 1) of the columns of a row-major table.
#[allow(clippy::needless_range_loop)]
pub fn sample_covariance(rows: &[Vec<f64>], n_cols: usize) -> Vec<Vec<f64>> {
    let means = column_means(rows, n_cols);
    let denom = (rows.len() as f64 - 1.0).max(1.0);
    let mut cov = vec![vec![0.0; n_cols]; n_cols];
    for i in 0..n_cols {
        for j in i..n_cols {
            let s: f64 = rows
                .iter()
                .map(|r| (r[i] - means[i]) * (r[j] - means[j]))
                .sum::<f64>()
                / denom;
            cov[i][j] = s;
            cov[j][i] = s;
        }
    }
    cov
}

/// Correlation matrix from a covariance matrix. Off-diagonal values are
/// clamped to [-1, 1].
pub fn cov_to_corr(cov: &[Vec<f64>]) -> RiskfrontResult<Vec<Vec<f64>>> {
    let n = cov.len();
    let mut std = Vec::with_capacity(n);
    for (i, row) in cov.iter().enumerate() {
        let v = row[i];
        if v.is_nan() || v <= 0.0 {
            return Err(RiskfrontError::DataError(format!(
                "Asset {i} has non-positive variance {v}"
            )));
        }
        std.push(v.sqrt());
    }
    Ok((0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        (cov[i][j] / (std[i] * std[j])).clamp(-1.0, 1.0)
                    }
                })
                .collect()
        })
        .collect())
}

/// Check that `cov` is an n x n symmetric matrix.
#[allow(clippy::needless_range_loop)]
pub fn validate_covariance_matrix(cov: &[Vec<f64>], n: usize) -> RiskfrontResult<()> {
    if cov.len() != n {
        return Err(RiskfrontError::InvalidInput {
            field: "covariance_matrix".into(),
            reason: format!("Expected {}x{} matrix but got {} rows", n, n, cov.len()),
        });
    }
    for (i, row) in cov.iter().enumerate() {
        if row.len() != n {
            return Err(RiskfrontError::InvalidInput {
                field: "covariance_matrix".into(),
                reason: format!("Row {} has {} columns, expected {}", i, row.len(), n),
            });
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let tolerance = 1e-9 * cov[i][j].abs().max(cov[j][i].abs()).max(1.0);
            if (cov[i][j] - cov[j][i]).abs() > tolerance {
                return Err(RiskfrontError::InvalidInput {
                    field: "covariance_matrix".into(),
                    reason: format!(
                        "Not symmetric: [{},{}]={} != [{},{}]={}",
                        i, j, cov[i][j], j, i, cov[j][i]
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_dot() {
        assert_eq!(vec_dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_quadratic_form_diagonal() {
        let sigma = vec![vec![4.0, 0.0], vec![0.0, 1.0]];
        assert!((quadratic_form(&[0.5, 0.5], &sigma) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_sample_covariance_two_columns() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]];
        let cov = sample_covariance(&rows, 2);
        assert!((cov[0][0] - 1.0).abs() < 1e-12);
        assert!((cov[1][1] - 4.0).abs() < 1e-12);
        assert!((cov[0][1] - 2.0).abs() < 1e-12);
        assert_eq!(cov[0][1], cov[1][0]);
    }

    #[test]
    fn test_cov_to_corr_perfect() {
        let cov = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let corr = cov_to_corr(&cov).unwrap();
        assert!((corr[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cov_to_corr_zero_variance() {
        let cov = vec![vec![0.0, 0.0], vec![0.0, 1.0]];
        assert!(cov_to_corr(&cov).is_err());
    }

    #[test]
    fn test_validate_asymmetric() {
        let cov = vec![vec![1.0, 0.5], vec![0.1, 1.0]];
        assert!(validate_covariance_matrix(&cov, 2).is_err());
        assert!(validate_covariance_matrix(&cov, 3).is_err());
    }
}
