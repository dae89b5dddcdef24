//! Spectral contrast
//!
//! Splits each power frame into octave sub-bands and reports, per band, the
//! dB difference between its peaks and its valleys. Tonal bands (a few strong
//! partials over a quiet floor) score high; noisy bands score low.
//!
//! Band edges are `[0, fmin, 2*fmin, 4*fmin, ..., nyquist]`: the first band
//! holds everything below `fmin`, the last band runs to Nyquist.
//!
//! # Reference
//!
//! Jiang, D.-N., Lu, L., Zhang, H.-J., Tao, J.-H., & Cai, L.-H. (2002).
//! Music Type Classification by Spectral Contrast Feature.
//! *Proceedings of the IEEE International Conference on Multimedia and Expo*.

use crate::error::AnalysisError;

/// Smallest power considered by the dB conversion
const POWER_FLOOR: f32 = 1e-10;

/// Compute spectral contrast for every frame
///
/// # Arguments
///
/// * `power` - Power spectrogram (n_frames × n_bins)
/// * `frequencies` - Bin center frequencies in Hz
/// * `n_bands` - Number of sub-bands (default: 6)
/// * `fmin` - Upper edge of the lowest band in Hz (default: 200.0)
/// * `quantile` - Fraction of each band averaged for peak and valley (default: 0.02)
///
/// # Returns
///
/// Contrast in dB, one `n_bands`-vector per frame. Silent bands report 0.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if a band would start above Nyquist.
pub fn spectral_contrast(
    power: &[Vec<f32>],
    frequencies: &[f32],
    n_bands: usize,
    fmin: f32,
    quantile: f32,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let bands = band_bin_ranges(frequencies, n_bands, fmin)?;

    log::debug!(
        "Computing spectral contrast: {} frames, {} bands from {} Hz",
        power.len(),
        n_bands,
        fmin
    );

    let mut scratch = Vec::new();
    let contrast = power
        .iter()
        .map(|frame| {
            bands
                .iter()
                .map(|&(lo, hi)| {
                    scratch.clear();
                    scratch.extend_from_slice(&frame[lo..hi]);
                    band_contrast(&mut scratch, quantile)
                })
                .collect()
        })
        .collect();

    Ok(contrast)
}

/// Bin index ranges `[lo, hi)` for each octave band
fn band_bin_ranges(
    frequencies: &[f32],
    n_bands: usize,
    fmin: f32,
) -> Result<Vec<(usize, usize)>, AnalysisError> {
    let n_bins = frequencies.len();
    let nyquist = frequencies.last().copied().unwrap_or(0.0);

    let mut edges = Vec::with_capacity(n_bands + 1);
    edges.push(0.0f32);
    for i in 0..n_bands.saturating_sub(1) {
        let edge = fmin * 2f32.powi(i as i32);
        if edge >= nyquist {
            return Err(AnalysisError::InvalidInput(format!(
                "Contrast band edge {} Hz is above Nyquist ({} Hz)",
                edge, nyquist
            )));
        }
        edges.push(edge);
    }

    let mut ranges = Vec::with_capacity(n_bands);
    for b in 0..n_bands {
        let lo_hz = edges[b];
        let lo = frequencies.iter().position(|&f| f >= lo_hz).unwrap_or(n_bins);
        let hi = if b + 1 < n_bands {
            let hi_hz = edges[b + 1];
            frequencies.iter().position(|&f| f >= hi_hz).unwrap_or(n_bins)
        } else {
            n_bins
        };
        // Every band keeps at least one bin
        let lo = lo.min(n_bins - 1);
        ranges.push((lo, hi.max(lo + 1)));
    }

    Ok(ranges)
}

/// Peak minus valley (dB) of one band; sorts `values` in place
fn band_contrast(values: &mut [f32], quantile: f32) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = values.len();
    let k = ((quantile * n as f32).round() as usize).clamp(1, n);

    let valley = values[..k].iter().sum::<f32>() / k as f32;
    let peak = values[n - k..].iter().sum::<f32>() / k as f32;

    power_to_db(peak) - power_to_db(valley)
}

fn power_to_db(power: f32) -> f32 {
    10.0 * power.max(POWER_FLOOR).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs() -> Vec<f32> {
        crate::features::stft::bin_frequencies(22050, 2048)
    }

    #[test]
    fn test_band_ranges_cover_spectrum() {
        let f = freqs();
        let ranges = band_bin_ranges(&f, 6, 200.0).unwrap();
        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[0].0, 0);
        assert_eq!(ranges.last().unwrap().1, f.len());
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "bands must be contiguous");
        }
    }

    #[test]
    fn test_band_above_nyquist_rejected() {
        let f = freqs();
        assert!(band_bin_ranges(&f, 12, 200.0).is_err());
    }

    #[test]
    fn test_flat_spectrum_has_no_contrast() {
        let f = freqs();
        let power = vec![vec![1.0f32; f.len()]; 3];
        let contrast = spectral_contrast(&power, &f, 6, 200.0, 0.02).unwrap();
        assert_eq!(contrast.len(), 3);
        assert!(contrast.iter().flatten().all(|&c| c.abs() < 1e-5));
    }

    #[test]
    fn test_peaky_band_has_contrast() {
        let f = freqs();
        let mut frame = vec![1e-4f32; f.len()];
        // strong partial inside the 400-800 Hz band
        let bin = f.iter().position(|&x| x >= 600.0).unwrap();
        frame[bin] = 1.0;
        let contrast = spectral_contrast(&[frame], &f, 6, 200.0, 0.02).unwrap();
        assert!(contrast[0][2] > 30.0, "contrast {:?}", contrast[0]);
        assert!(contrast[0][0].abs() < 1e-5);
    }

    #[test]
    fn test_silence_is_zero() {
        let f = freqs();
        let power = vec![vec![0.0f32; f.len()]];
        let contrast = spectral_contrast(&power, &f, 6, 200.0, 0.02).unwrap();
        assert!(contrast[0].iter().all(|&c| c == 0.0));
    }
}
