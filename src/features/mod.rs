//! Feature extraction modules
//!
//! This module contains all frame-wise feature extraction:
//! - STFT and inverse STFT
//! - Spectral shape (centroid, bandwidth, rolloff) and contrast
//! - MFCC and chroma
//! - Onset strength and harmonic-percussive separation
//!
//! and the descriptor estimators built on top of them:
//! - Period estimation (tempo)
//! - Beat tracking
//! - Key detection

pub mod beat_tracking;
pub mod chroma;
pub mod hpss;
pub mod key;
pub mod mfcc;
pub mod onset;
pub mod period;
pub mod spectral;
pub mod stft;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::AudioBuffer;
use stft::Spectrogram;

/// Frame-wise features of one recording
///
/// Every per-frame series has `n_frames` entries, frame `t` covering samples
/// `[t * hop_size, t * hop_size + frame_size)`.
#[derive(Debug, Clone)]
pub struct SpectralFeatures {
    /// Number of STFT frames
    pub n_frames: usize,

    /// Spectral centroid per frame (Hz)
    pub centroid: Vec<f32>,

    /// Spectral rolloff per frame (Hz)
    pub rolloff: Vec<f32>,

    /// Spectral bandwidth per frame (Hz)
    pub bandwidth: Vec<f32>,

    /// Octave-band spectral contrast per frame (dB, `contrast_bands` values)
    pub contrast: Vec<Vec<f32>>,

    /// MFCC vector per frame (`n_mfcc` values)
    pub mfcc: Vec<Vec<f32>>,

    /// 12-bin chroma vector per frame
    pub chroma: Vec<Vec<f32>>,

    /// Onset strength per frame
    pub onset_strength: Vec<f32>,

    /// Time-domain harmonic component (input length)
    pub harmonic: Vec<f32>,

    /// Time-domain percussive component (input length)
    pub percussive: Vec<f32>,

    /// Sample rate the features were computed at (Hz)
    pub sample_rate: u32,

    /// Hop between frames (samples)
    pub hop_size: usize,

    /// Duration of the analyzed buffer in seconds
    pub duration_seconds: f32,

    spectrogram: Spectrogram,
}

impl SpectralFeatures {
    /// Magnitude spectrogram in dB relative to its maximum (n_frames × n_bins)
    pub fn spectrogram_db(&self) -> Vec<Vec<f32>> {
        self.spectrogram.to_db()
    }

    /// Underlying STFT
    pub fn spectrogram(&self) -> &Spectrogram {
        &self.spectrogram
    }
}

/// Extract all frame-wise features from a mono buffer
///
/// # Arguments
///
/// * `buffer` - Mono audio; analyzed at its own sample rate
/// * `config` - Analysis configuration
///
/// # Returns
///
/// Frame-aligned feature series plus the HPSS components
///
/// # Errors
///
/// - `AnalysisError::InvalidInput` if the configuration is inconsistent
/// - `AnalysisError::InsufficientSamples` if the buffer is shorter than one frame
pub fn extract(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
) -> Result<SpectralFeatures, AnalysisError> {
    config.validate()?;

    let samples = buffer.samples();
    let sample_rate = buffer.sample_rate();

    log::debug!(
        "Extracting features: {} samples at {} Hz, frame={}, hop={}",
        samples.len(),
        sample_rate,
        config.frame_size,
        config.hop_size
    );

    let spectrogram = Spectrogram::compute(samples, sample_rate, config.frame_size, config.hop_size)?;
    let frequencies = spectrogram.bin_frequencies();
    let power = spectrogram.power();

    let (centroid, bandwidth, rolloff) =
        spectral::shape_series(spectrogram.magnitudes(), &frequencies, config.rolloff_percent);

    let contrast = spectral::spectral_contrast(
        &power,
        &frequencies,
        config.contrast_bands,
        config.contrast_fmin,
        config.contrast_quantile,
    )?;

    let mel = mfcc::MelFilterbank::new(config.n_mels, config.frame_size, sample_rate);
    let mel_db = mfcc::power_to_db(&mel.spectrogram(&power));
    let mfcc = mfcc::mfcc_from_mel_db(&mel_db, config.n_mfcc);
    let onset_strength = onset::onset_strength(&mel_db);

    let chroma = chroma::extract_chroma(
        &power,
        &frequencies,
        config.center_frequency,
        config.soft_chroma_mapping,
        config.soft_mapping_sigma,
    );

    let hpss::HarmonicPercussive {
        harmonic,
        percussive,
    } = hpss::separate(
        &spectrogram,
        config.hpss_harmonic_kernel,
        config.hpss_percussive_kernel,
        samples.len(),
    )?;

    let n_frames = spectrogram.n_frames();

    log::debug!(
        "Extracted {} frames ({} bins, {} mel bands, {} MFCC)",
        n_frames,
        spectrogram.n_bins(),
        config.n_mels,
        config.n_mfcc
    );

    Ok(SpectralFeatures {
        n_frames,
        centroid,
        rolloff,
        bandwidth,
        contrast,
        mfcc,
        chroma,
        onset_strength,
        harmonic,
        percussive,
        sample_rate,
        hop_size: config.hop_size,
        duration_seconds: buffer.duration_seconds(),
        spectrogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_buffer(freq: f32, seconds: f32, sample_rate: u32) -> AudioBuffer {
        let n = (seconds * sample_rate as f32) as usize;
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioBuffer::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_all_series_are_frame_aligned() {
        let config = AnalysisConfig::default();
        let buffer = sine_buffer(440.0, 1.0, 22050);
        let features = extract(&buffer, &config).unwrap();

        let n = features.n_frames;
        assert_eq!(n, (22050 - 2048) / 512 + 1);
        assert_eq!(features.centroid.len(), n);
        assert_eq!(features.rolloff.len(), n);
        assert_eq!(features.bandwidth.len(), n);
        assert_eq!(features.contrast.len(), n);
        assert_eq!(features.mfcc.len(), n);
        assert_eq!(features.chroma.len(), n);
        assert_eq!(features.onset_strength.len(), n);
        assert_eq!(features.spectrogram_db().len(), n);

        assert!(features.contrast.iter().all(|c| c.len() == config.contrast_bands));
        assert!(features.mfcc.iter().all(|c| c.len() == config.n_mfcc));
        assert!(features.chroma.iter().all(|c| c.len() == 12));
        assert_eq!(features.harmonic.len(), buffer.len());
        assert_eq!(features.percussive.len(), buffer.len());
    }

    #[test]
    fn test_single_window_has_one_frame() {
        let config = AnalysisConfig::default();
        let buffer = AudioBuffer::new(vec![0.0; config.frame_size], 22050).unwrap();
        let features = extract(&buffer, &config).unwrap();
        assert_eq!(features.n_frames, 1);
        assert_eq!(features.onset_strength, vec![0.0]);
        assert_eq!(features.centroid, vec![0.0]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let config = AnalysisConfig::default();
        let buffer = AudioBuffer::new(vec![0.1; 100], 22050).unwrap();
        let result = extract(&buffer, &config);
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientSamples { samples: 100, required: 2048 })
        ));
    }

    #[test]
    fn test_sine_chroma_points_at_a() {
        let config = AnalysisConfig::default();
        let buffer = sine_buffer(440.0, 1.0, 22050);
        let features = extract(&buffer, &config).unwrap();
        let profile = chroma::mean_profile(&features.chroma);
        let (argmax, _) = profile
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
        assert_eq!(argmax, 9);
    }
}
