//! Chroma vector extraction
//!
//! Folds an STFT power spectrogram into 12 pitch classes (C = 0 ... B = 11).

use super::normalization::normalize_max;

/// Lowest frequency mapped to a pitch class (Hz); below this, bins are too coarse
const MIN_CHROMA_FREQUENCY: f32 = 32.7;

/// Soft-mapping weights below this are dropped
const MIN_WEIGHT: f32 = 1e-3;

/// Extract chroma vectors from a power spectrogram
///
/// # Arguments
///
/// * `power` - Power spectrogram (n_frames × n_bins)
/// * `frequencies` - Bin center frequencies in Hz
/// * `center_frequency` - Reference tuning for A4 (default: 440.0 Hz)
/// * `soft_mapping` - Spread each bin over neighbouring pitch classes
/// * `sigma` - Soft mapping standard deviation in semitones (default: 0.5)
///
/// # Returns
///
/// One 12-element chroma vector per frame, each scaled so its largest bin is
/// 1.0. Silent frames stay all-zero.
pub fn extract_chroma(
    power: &[Vec<f32>],
    frequencies: &[f32],
    center_frequency: f32,
    soft_mapping: bool,
    sigma: f32,
) -> Vec<Vec<f32>> {
    log::debug!(
        "Extracting chroma: {} frames, {} bins, A4={} Hz, soft={}",
        power.len(),
        frequencies.len(),
        center_frequency,
        soft_mapping
    );

    let mapping = bin_to_pitch_class_weights(frequencies, center_frequency, soft_mapping, sigma);

    power
        .iter()
        .map(|frame| {
            let mut chroma = vec![0.0f32; 12];
            for (bin_weights, &p) in mapping.iter().zip(frame) {
                for &(class, w) in bin_weights {
                    chroma[class] += w * p;
                }
            }
            normalize_max(&mut chroma);
            chroma
        })
        .collect()
}

/// Pitch-class weights for each FFT bin
///
/// A bin at frequency `f` sits at `12 * log2(f / A4) + 9` semitones above C.
/// Hard mapping assigns it to the nearest class; soft mapping distributes it
/// with a Gaussian over circular semitone distance (weights sum to 1).
fn bin_to_pitch_class_weights(
    frequencies: &[f32],
    center_frequency: f32,
    soft_mapping: bool,
    sigma: f32,
) -> Vec<Vec<(usize, f32)>> {
    frequencies
        .iter()
        .map(|&f| {
            if f < MIN_CHROMA_FREQUENCY {
                return Vec::new();
            }
            let semitones = 12.0 * (f / center_frequency).log2() + 9.0;
            let position = semitones.rem_euclid(12.0);

            if !soft_mapping {
                let class = (position.round() as usize) % 12;
                return vec![(class, 1.0)];
            }

            let raw: Vec<(usize, f32)> = (0..12)
                .map(|class| {
                    let d = (position - class as f32).abs();
                    let d = d.min(12.0 - d);
                    (class, (-0.5 * (d / sigma).powi(2)).exp())
                })
                .collect();
            let total: f32 = raw.iter().map(|&(_, w)| w).sum();
            raw.into_iter()
                .map(|(c, w)| (c, w / total))
                .filter(|&(_, w)| w >= MIN_WEIGHT)
                .collect()
        })
        .collect()
}
