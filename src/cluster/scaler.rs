//! Per-call z-score standardization

/// Standardize every column to zero mean and unit population variance
///
/// Columns without variance map to 0.
pub fn standardize(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_rows = matrix.len();
    let n_cols = matrix.first().map_or(0, |r| r.len());
    if n_rows == 0 {
        return Vec::new();
    }

    let mut means = vec![0.0f64; n_cols];
    let mut stds = vec![0.0f64; n_cols];
    for c in 0..n_cols {
        let mean = matrix.iter().map(|r| r[c]).sum::<f64>() / n_rows as f64;
        let var = matrix.iter().map(|r| (r[c] - mean).powi(2)).sum::<f64>() / n_rows as f64;
        means[c] = mean;
        stds[c] = var.sqrt();
    }

    matrix
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, &v)| {
                    if stds[c] > 1e-12 {
                        (v - means[c]) / stds[c]
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}
