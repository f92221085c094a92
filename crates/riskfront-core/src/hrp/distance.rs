/// Correlation distance d(i,j) = sqrt(0.5 * (1 - corr(i,j))).
///
/// Maps correlation in [-1, 1] onto a metric in [0, 1]. Inputs are clamped
/// to [-1, 1] first so rounding noise can not produce NaN.
pub fn correlation_distance(corr: &[Vec<f64>]) -> Vec<Vec<f64>> {
    corr.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, c)| {
                    if i == j {
                        0.0
                    } else {
                        (0.5 * (1.0 - c.clamp(-1.0, 1.0))).sqrt()
                    }
                })
                .collect()
        })
        .collect()
}
