//! Summary statistics over per-frame series
//!
//! Means and population standard deviations. Sums accumulate in `f64`;
//! empty inputs summarize to 0.

/// Arithmetic mean; 0 for an empty series
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64) as f32
}

/// Population standard deviation; 0 for an empty series
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
    let var = values
        .iter()
        .map(|&v| (v as f64 - m).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt() as f32
}

/// Mean and standard deviation over every element of a frame-major matrix
pub fn matrix_mean_std(frames: &[Vec<f32>]) -> (f32, f32) {
    let flat: Vec<f32> = frames.iter().flatten().copied().collect();
    (mean(&flat), std_dev(&flat))
}

/// Per-column mean and standard deviation of a frame-major matrix
///
/// # Returns
///
/// `(means, stds)`, one entry per column of the first frame
pub fn column_mean_std(frames: &[Vec<f32>]) -> (Vec<f32>, Vec<f32>) {
    let n_cols = frames.first().map_or(0, |f| f.len());
    (0..n_cols)
        .map(|c| {
            let column: Vec<f32> = frames.iter().filter_map(|f| f.get(c).copied()).collect();
            (mean(&column), std_dev(&column))
        })
        .unzip()
}

/// Mean of one column of a frame-major matrix
pub fn column_mean(frames: &[Vec<f32>], column: usize) -> f32 {
    let values: Vec<f32> = frames.iter().filter_map(|f| f.get(column).copied()).collect();
    mean(&values)
}
