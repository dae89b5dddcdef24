//! Musical descriptors derived from frame-wise features
//!
//! Tempo, beat positions, key and harmonic ratio. Each estimator reads the
//! extracted features and returns a new value; nothing is shared or mutated.

use crate::analysis::result::Key;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::{beat_tracking, hpss, key, period, SpectralFeatures};

/// Higher-level descriptors of one recording
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptors {
    /// Global tempo in BPM (always > 0)
    pub tempo: f32,

    /// Tempo confidence (0.0-1.0)
    pub tempo_confidence: f32,

    /// Detected key
    pub key: Key,

    /// Key confidence (0.0-1.0)
    pub key_confidence: f32,

    /// Fraction of signal amplitude in the harmonic component (0.0-1.0)
    pub harmonic_ratio: f32,

    /// Duration in seconds
    pub duration: f32,

    /// Beat times in seconds
    pub beat_times: Vec<f32>,
}

/// Estimate descriptors from extracted features
///
/// # Errors
///
/// Propagates `AnalysisError::InvalidInput` from the estimators when the
/// configuration is out of range.
pub fn estimate(
    features: &SpectralFeatures,
    config: &AnalysisConfig,
) -> Result<Descriptors, AnalysisError> {
    let tempo = period::estimate_tempo(
        &features.onset_strength,
        features.sample_rate,
        features.hop_size,
        config.min_bpm,
        config.max_bpm,
        config.start_bpm,
        config.tempo_std_octaves,
    )?;

    let beat_times = beat_tracking::track_beats(
        &features.onset_strength,
        tempo.bpm,
        features.sample_rate,
        features.hop_size,
        config.beat_tightness,
    )?;

    let key_result = key::detect_key(&features.chroma, config.key_strategy)?;

    let harmonic_ratio = hpss::harmonic_ratio(&features.harmonic, &features.percussive);

    log::debug!(
        "Descriptors: {:.2} BPM ({} beats), key {} ({:.2}), harmonic ratio {:.3}",
        tempo.bpm,
        beat_times.len(),
        key_result.key.display_name(),
        key_result.confidence,
        harmonic_ratio
    );

    Ok(Descriptors {
        tempo: tempo.bpm,
        tempo_confidence: tempo.confidence,
        key: key_result.key,
        key_confidence: key_result.confidence,
        harmonic_ratio,
        duration: features.duration_seconds,
        beat_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;
    use crate::io::AudioBuffer;

    #[test]
    fn test_silence_descriptors() {
        let config = AnalysisConfig::default();
        let buffer = AudioBuffer::new(vec![0.0; 22050], 22050).unwrap();
        let features = extract(&buffer, &config).unwrap();
        let d = estimate(&features, &config).unwrap();

        assert_eq!(d.tempo, config.start_bpm);
        assert_eq!(d.harmonic_ratio, 0.0);
        assert!(d.beat_times.is_empty());
        assert!((d.duration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_click_track_tempo() {
        let config = AnalysisConfig::default();
        let sr = 22050;
        let mut samples = vec![0.0f32; sr * 8];
        // 120 BPM: a short noise-like burst every half second
        for beat in 0..16 {
            let start = beat * sr / 2;
            for i in 0..200 {
                let phase = (i * 7919 % 200) as f32 / 200.0;
                samples[start + i] = (phase - 0.5) * (1.0 - i as f32 / 200.0);
            }
        }
        let buffer = AudioBuffer::new(samples, sr as u32).unwrap();
        let features = extract(&buffer, &config).unwrap();
        let d = estimate(&features, &config).unwrap();

        assert!((d.tempo - 120.0).abs() < 6.0, "tempo {:.2}", d.tempo);
        assert!(d.beat_times.len() >= 10, "{} beats", d.beat_times.len());
        assert!(d.harmonic_ratio < 0.5, "harmonic ratio {:.3}", d.harmonic_ratio);
    }
}
