//! Configuration parameters for audio analysis

use crate::analysis::labels::LabelThresholds;
use crate::error::AnalysisError;
use crate::features::key::KeyStrategy;
use serde::{Deserialize, Serialize};

/// Sample rate every analysis runs at (Hz)
pub const TARGET_SAMPLE_RATE: u32 = 22050;

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Loading
    /// Sample rate the loader resamples to (default: 22050)
    pub sample_rate: u32,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    pub hop_size: usize,

    // Spectral shape
    /// Fraction of frame energy below the rolloff frequency (default: 0.85)
    pub rolloff_percent: f32,

    /// Number of spectral contrast sub-bands (default: 6)
    pub contrast_bands: usize,

    /// Upper edge of the lowest contrast band in Hz (default: 200.0)
    pub contrast_fmin: f32,

    /// Quantile used for contrast peaks and valleys (default: 0.02)
    pub contrast_quantile: f32,

    // Cepstrum
    /// Number of mel filters (default: 128)
    pub n_mels: usize,

    /// Number of cepstral coefficients kept (default: 13)
    pub n_mfcc: usize,

    // Key detection
    /// Center frequency for chroma extraction (default: 440.0 Hz, A4)
    pub center_frequency: f32,

    /// Enable soft chroma mapping (default: true)
    /// Soft mapping spreads frequency bins to neighboring semitones for robustness
    pub soft_chroma_mapping: bool,

    /// Soft mapping standard deviation in semitones (default: 0.5)
    pub soft_mapping_sigma: f32,

    /// Key search strategy (default: rotation search over 24 keys)
    pub key_strategy: KeyStrategy,

    // Harmonic/percussive separation
    /// Median filter length along time, in frames (default: 31)
    pub hpss_harmonic_kernel: usize,

    /// Median filter length along frequency, in bins (default: 31)
    pub hpss_percussive_kernel: usize,

    // Tempo
    /// Minimum BPM to consider (default: 30.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 300.0)
    pub max_bpm: f32,

    /// Center of the tempo prior, also the fallback for aperiodic input (default: 120.0)
    pub start_bpm: f32,

    /// Width of the log-normal tempo prior in octaves (default: 1.0)
    pub tempo_std_octaves: f32,

    /// Beat tracker tightness, must be > 0; higher values stick closer to the tempo (default: 100.0)
    pub beat_tightness: f32,

    // Labels
    /// Thresholds for rhythm and timbre labels
    pub thresholds: LabelThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            frame_size: 2048,
            hop_size: 512,
            rolloff_percent: 0.85,
            contrast_bands: 6,
            contrast_fmin: 200.0,
            contrast_quantile: 0.02,
            n_mels: 128,
            n_mfcc: 13,
            center_frequency: 440.0,
            soft_chroma_mapping: true,
            soft_mapping_sigma: 0.5,
            key_strategy: KeyStrategy::RotationSearch,
            hpss_harmonic_kernel: 31,
            hpss_percussive_kernel: 31,
            min_bpm: 30.0,
            max_bpm: 300.0,
            start_bpm: 120.0,
            tempo_std_octaves: 1.0,
            beat_tightness: 100.0,
            thresholds: LabelThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check that parameters are mutually consistent
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` naming the first offending parameter
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |msg: String| Err(AnalysisError::InvalidInput(msg));

        if self.sample_rate == 0 {
            return invalid("sample_rate must be > 0".to_string());
        }
        if self.frame_size < 2 {
            return invalid(format!("frame_size must be >= 2, got {}", self.frame_size));
        }
        if self.hop_size == 0 {
            return invalid("hop_size must be > 0".to_string());
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent <= 1.0) {
            return invalid(format!(
                "rolloff_percent must be in (0, 1], got {}",
                self.rolloff_percent
            ));
        }
        if self.contrast_bands == 0 {
            return invalid("contrast_bands must be > 0".to_string());
        }
        if !(self.contrast_fmin > 0.0) {
            return invalid(format!("contrast_fmin must be > 0, got {}", self.contrast_fmin));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        let top_edge = self.contrast_fmin * 2f32.powi(self.contrast_bands as i32 - 2);
        if top_edge >= nyquist {
            return invalid(format!(
                "contrast bands exceed Nyquist: fmin {} Hz with {} bands reaches {} Hz (nyquist {} Hz)",
                self.contrast_fmin, self.contrast_bands, top_edge, nyquist
            ));
        }
        if !(self.contrast_quantile > 0.0 && self.contrast_quantile < 1.0) {
            return invalid(format!(
                "contrast_quantile must be in (0, 1), got {}",
                self.contrast_quantile
            ));
        }
        if self.n_mels == 0 || self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            return invalid(format!(
                "need 0 < n_mfcc <= n_mels, got n_mfcc={} n_mels={}",
                self.n_mfcc, self.n_mels
            ));
        }
        if !(self.center_frequency > 0.0) {
            return invalid("center_frequency must be > 0".to_string());
        }
        if self.soft_chroma_mapping && !(self.soft_mapping_sigma > 0.0) {
            return invalid("soft_mapping_sigma must be > 0 when soft mapping is enabled".to_string());
        }
        if self.hpss_harmonic_kernel == 0 || self.hpss_percussive_kernel == 0 {
            return invalid("HPSS kernel sizes must be > 0".to_string());
        }
        if !(self.min_bpm > 0.0 && self.min_bpm < self.max_bpm) {
            return invalid(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.min_bpm, self.max_bpm
            ));
        }
        if !(self.start_bpm > 0.0) || !(self.tempo_std_octaves > 0.0) {
            return invalid("start_bpm and tempo_std_octaves must be > 0".to_string());
        }
        if !(self.beat_tightness > 0.0) {
            return invalid(format!("beat_tightness must be > 0, got {}", self.beat_tightness));
        }
        self.thresholds.validate()
    }
}
