//! Analysis and result aggregation modules
//!
//! Turns frame-wise features and descriptors into the final record:
//! - Descriptor estimation (tempo, beats, key, harmonic ratio)
//! - Summary statistics
//! - Qualitative labels
//! - Result types

pub mod descriptors;
pub mod labels;
pub mod result;
pub mod stats;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::SpectralFeatures;
use descriptors::Descriptors;
use labels::{format_duration, rhythm_complexity_ratio, timbre_description, RhythmComplexity};
use result::{
    AnalysisRecord, BasicInfo, ProductionInsights, RhythmSummary, SpectralSummary, TimbreSummary,
};

/// Build the validated record for one recording
///
/// # Arguments
///
/// * `features` - Frame-wise features
/// * `descriptors` - Descriptors estimated from the same features
/// * `config` - Analysis configuration (label thresholds)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the assembled record fails
/// validation.
pub fn aggregate(
    features: &SpectralFeatures,
    descriptors: &Descriptors,
    config: &AnalysisConfig,
) -> Result<AnalysisRecord, AnalysisError> {
    let thresholds = &config.thresholds;

    let (contrast_mean, contrast_std) = stats::matrix_mean_std(&features.contrast);
    let spectral = SpectralSummary {
        centroid_mean: stats::mean(&features.centroid),
        centroid_std: stats::std_dev(&features.centroid),
        rolloff_mean: stats::mean(&features.rolloff),
        rolloff_std: stats::std_dev(&features.rolloff),
        bandwidth_mean: stats::mean(&features.bandwidth),
        bandwidth_std: stats::std_dev(&features.bandwidth),
        contrast_mean,
        contrast_std,
    };

    let onset_mean = stats::mean(&features.onset_strength);
    let onset_std = stats::std_dev(&features.onset_strength);
    let complexity = rhythm_complexity_ratio(onset_mean, onset_std);
    let rhythm = RhythmSummary {
        onset_strength_mean: onset_mean,
        onset_strength_std: onset_std,
        complexity,
        complexity_label: RhythmComplexity::classify(complexity, thresholds),
        beat_times: descriptors.beat_times.clone(),
    };

    let (mfcc_mean, mfcc_std) = stats::column_mean_std(&features.mfcc);
    let timbre = TimbreSummary {
        mfcc_mean,
        mfcc_std,
        harmonic_ratio: descriptors.harmonic_ratio,
        description: timbre_description(
            descriptors.harmonic_ratio,
            spectral.centroid_mean,
            thresholds,
        ),
    };

    let production = ProductionInsights {
        brightness: spectral.rolloff_mean,
        spectral_width: spectral.bandwidth_mean,
        contrast_ratio: contrast_ratio(&features.contrast),
    };

    let basic_info = BasicInfo {
        tempo: descriptors.tempo,
        key: descriptors.key,
        key_name: descriptors.key.display_name(),
        key_confidence: descriptors.key_confidence,
        duration: descriptors.duration,
        duration_formatted: format_duration(descriptors.duration),
    };

    log::debug!(
        "Aggregated record: {:.2} BPM, {}, {} ({}), timbre \"{}\"",
        basic_info.tempo,
        basic_info.key_name,
        basic_info.duration_formatted,
        rhythm.complexity_label,
        timbre.description
    );

    AnalysisRecord::new(basic_info, spectral, rhythm, timbre, production)
}

/// Mean contrast of the lowest band over the mean of the remaining bands
///
/// 0 when there is a single band or the remaining bands average to 0.
fn contrast_ratio(contrast: &[Vec<f32>]) -> f32 {
    let n_bands = contrast.first().map_or(0, |f| f.len());
    if n_bands < 2 {
        return 0.0;
    }
    let low = stats::column_mean(contrast, 0);
    let rest: Vec<f32> = contrast.iter().flat_map(|f| f[1..].iter().copied()).collect();
    let rest_mean = stats::mean(&rest);
    if rest_mean.abs() < 1e-10 {
        return 0.0;
    }
    low / rest_mean
}
