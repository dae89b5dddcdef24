//! Harmonic-percussive source separation (HPSS)
//!
//! Harmonic sounds are stable in frequency over time (horizontal lines in a
//! spectrogram); percussive sounds are short and broadband (vertical lines).
//! A median filter along time therefore keeps the harmonic part, a median
//! filter along frequency keeps the percussive part. Soft Wiener masks built
//! from the two filtered spectrograms split the complex STFT, which is then
//! inverted back to two time-domain signals.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx)*.

use super::stft::{istft, Spectrogram};
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Exponent of the Wiener soft masks
const MASK_POWER: i32 = 2;

/// Time-domain harmonic and percussive components of a signal
#[derive(Debug, Clone)]
pub struct HarmonicPercussive {
    /// Harmonic (tonal) component, same length as the input
    pub harmonic: Vec<f32>,
    /// Percussive (transient) component, same length as the input
    pub percussive: Vec<f32>,
}

/// Separate a spectrogram into time-domain harmonic and percussive signals
///
/// # Arguments
///
/// * `spectrogram` - STFT of the signal
/// * `harmonic_kernel` - Median length along time, in frames (default: 31)
/// * `percussive_kernel` - Median length along frequency, in bins (default: 31)
/// * `length` - Length of the original signal in samples
pub fn separate(
    spectrogram: &Spectrogram,
    harmonic_kernel: usize,
    percussive_kernel: usize,
    length: usize,
) -> Result<HarmonicPercussive, AnalysisError> {
    let (harmonic_mag, percussive_mag) =
        hpss_decompose(spectrogram.magnitudes(), harmonic_kernel, percussive_kernel)?;

    let mut harmonic_spec = Vec::with_capacity(spectrogram.n_frames());
    let mut percussive_spec = Vec::with_capacity(spectrogram.n_frames());

    for ((spectrum, h_frame), p_frame) in spectrogram
        .spectra()
        .iter()
        .zip(&harmonic_mag)
        .zip(&percussive_mag)
    {
        let mut h_out = Vec::with_capacity(spectrum.len());
        let mut p_out = Vec::with_capacity(spectrum.len());
        for ((&x, &h), &p) in spectrum.iter().zip(h_frame).zip(p_frame) {
            let (mask_h, mask_p) = soft_masks(h, p);
            h_out.push(x * mask_h);
            p_out.push(x * mask_p);
        }
        harmonic_spec.push(h_out);
        percussive_spec.push(p_out);
    }

    let frame_size = spectrogram.frame_size();
    let hop_size = spectrogram.hop_size();

    Ok(HarmonicPercussive {
        harmonic: istft(&harmonic_spec, frame_size, hop_size, length)?,
        percussive: istft(&percussive_spec, frame_size, hop_size, length)?,
    })
}

/// Decompose a magnitude spectrogram into harmonic and percussive parts
///
/// # Arguments
///
/// * `magnitude_spec` - Magnitude spectrogram (n_frames × n_bins)
/// * `harmonic_kernel` - Median filter length along time
/// * `percussive_kernel` - Median filter length along frequency
///
/// # Returns
///
/// Tuple of (harmonic, percussive) median-filtered spectrograms
pub fn hpss_decompose(
    magnitude_spec: &[Vec<f32>],
    harmonic_kernel: usize,
    percussive_kernel: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), AnalysisError> {
    if harmonic_kernel == 0 || percussive_kernel == 0 {
        return Err(AnalysisError::InvalidInput(
            "HPSS kernel sizes must be > 0".to_string(),
        ));
    }

    let n_frames = magnitude_spec.len();
    let n_bins = magnitude_spec.first().map_or(0, |f| f.len());

    log::debug!(
        "Decomposing spectrogram with HPSS: {} frames x {} bins, kernels ({}, {})",
        n_frames,
        n_bins,
        harmonic_kernel,
        percussive_kernel
    );

    // Harmonic: median across time for every bin
    let mut harmonic = vec![vec![0.0f32; n_bins]; n_frames];
    let mut column = vec![0.0f32; n_frames];
    let mut scratch = Vec::with_capacity(harmonic_kernel);
    for bin in 0..n_bins {
        for (t, frame) in magnitude_spec.iter().enumerate() {
            column[t] = frame[bin];
        }
        let filtered = median_filter(&column, harmonic_kernel, &mut scratch);
        for (t, v) in filtered.into_iter().enumerate() {
            harmonic[t][bin] = v;
        }
    }

    // Percussive: median across frequency within each frame
    let mut scratch = Vec::with_capacity(percussive_kernel);
    let percussive = magnitude_spec
        .iter()
        .map(|frame| median_filter(frame, percussive_kernel, &mut scratch))
        .collect();

    Ok((harmonic, percussive))
}

/// Wiener soft masks `(H^2 / (H^2 + P^2), P^2 / (H^2 + P^2))`; both 0 when `H = P = 0`
fn soft_masks(h: f32, p: f32) -> (f32, f32) {
    let h_pow = h.powi(MASK_POWER);
    let p_pow = p.powi(MASK_POWER);
    let total = h_pow + p_pow;
    if total <= EPSILON * EPSILON {
        return (0.0, 0.0);
    }
    (h_pow / total, p_pow / total)
}

/// Sliding median with edge samples repeated beyond the boundaries
///
/// The window spans `kernel / 2` samples on each side of the center.
fn median_filter(signal: &[f32], kernel: usize, scratch: &mut Vec<f32>) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let half = kernel / 2;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        scratch.clear();
        for offset in 0..=2 * half {
            let idx = (i + offset).saturating_sub(half).min(n - 1);
            scratch.push(signal[idx]);
        }
        let mid = scratch.len() / 2;
        let (_, median, _) = scratch.select_nth_unstable_by(mid, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        out.push(*median);
    }

    out
}

/// Fraction of mean absolute amplitude carried by the harmonic component
///
/// `mean|h| / (mean|h| + mean|p|)`, bounded in [0, 1]. Returns 0 when both
/// components are silent.
pub fn harmonic_ratio(harmonic: &[f32], percussive: &[f32]) -> f32 {
    let h = mean_abs(harmonic);
    let p = mean_abs(percussive);
    let total = h + p;
    if total <= 0.0 {
        return 0.0;
    }
    (h / total).clamp(0.0, 1.0)
}

fn mean_abs(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|x| x.abs()).sum::<f32>() / signal.len() as f32
}
