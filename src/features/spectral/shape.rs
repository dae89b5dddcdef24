//! Spectral shape descriptors: centroid, bandwidth, rolloff
//!
//! All three treat a magnitude frame as a distribution over bin
//! frequencies. A frame with no energy reports 0 for every descriptor.

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Magnitude-weighted mean frequency of one frame (Hz)
pub fn centroid(magnitudes: &[f32], frequencies: &[f32]) -> f32 {
    let total: f32 = magnitudes.iter().sum();
    if total <= EPSILON {
        return 0.0;
    }
    let weighted: f32 = magnitudes
        .iter()
        .zip(frequencies)
        .map(|(&m, &f)| m * f)
        .sum();
    weighted / total
}

/// Magnitude-weighted standard deviation of frequency around `centroid_hz`
pub fn bandwidth(magnitudes: &[f32], frequencies: &[f32], centroid_hz: f32) -> f32 {
    let total: f32 = magnitudes.iter().sum();
    if total <= EPSILON {
        return 0.0;
    }
    let variance: f32 = magnitudes
        .iter()
        .zip(frequencies)
        .map(|(&m, &f)| m * (f - centroid_hz) * (f - centroid_hz))
        .sum::<f32>()
        / total;
    variance.max(0.0).sqrt()
}

/// Lowest bin frequency at which cumulative magnitude reaches `percent` of the total
pub fn rolloff(magnitudes: &[f32], frequencies: &[f32], percent: f32) -> f32 {
    let total: f32 = magnitudes.iter().sum();
    if total <= EPSILON {
        return 0.0;
    }
    let threshold = percent * total;
    let mut cumulative = 0.0f32;
    for (&m, &f) in magnitudes.iter().zip(frequencies) {
        cumulative += m;
        if cumulative >= threshold {
            return f;
        }
    }
    frequencies.last().copied().unwrap_or(0.0)
}

/// Centroid, bandwidth and rolloff series over a magnitude spectrogram
///
/// # Returns
///
/// `(centroid, bandwidth, rolloff)`, one value per frame each
pub fn shape_series(
    magnitudes: &[Vec<f32>],
    frequencies: &[f32],
    rolloff_percent: f32,
) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let mut centroids = Vec::with_capacity(magnitudes.len());
    let mut bandwidths = Vec::with_capacity(magnitudes.len());
    let mut rolloffs = Vec::with_capacity(magnitudes.len());

    for frame in magnitudes {
        let c = centroid(frame, frequencies);
        centroids.push(c);
        bandwidths.push(bandwidth(frame, frequencies, c));
        rolloffs.push(rolloff(frame, frequencies, rolloff_percent));
    }

    (centroids, bandwidths, rolloffs)
}
