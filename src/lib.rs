//! # Soundprint
//!
//! Music feature extraction, descriptor estimation and clustering.
//!
//! ## Features
//!
//! - **Spectral features**: centroid, rolloff, bandwidth, contrast, MFCC and
//!   chroma from one STFT, plus onset strength and harmonic-percussive separation
//! - **Descriptors**: tempo (autocorrelation with a tempo prior), beat times
//!   (dynamic programming), key (template correlation over 24 keys) and
//!   harmonic ratio
//! - **Records**: validated, serializable summaries with rhythm and timbre
//!   labels and production insights
//! - **Clustering**: seeded k-means over standardized descriptor columns
//!
//! ## Quick Start
//!
//! ```no_run
//! use soundprint::{analyze_file, cluster, AnalysisConfig};
//!
//! let config = AnalysisConfig::default();
//! let record = analyze_file("song.mp3", &config)?;
//!
//! println!("Tempo: {:.1} BPM", record.tempo());
//! println!("Key: {}", record.basic_info().key_name);
//! println!("Timbre: {}", record.timbre().description);
//!
//! let other = analyze_file("other.flac", &config)?;
//! let clusters = cluster(&[record, other], 2)?;
//! println!("{:?}", clusters.assignments);
//! # Ok::<(), soundprint::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! File → Loader (decode, downmix, resample) → Feature Extraction → Descriptors → AnalysisRecord
//! AnalysisRecord* → Feature Matrix → Standardize → k-means → ClusterResult
//! ```
//!
//! Every stage takes the previous stage's output by reference and returns a
//! new value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod cluster;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::labels::{LabelThresholds, RhythmComplexity};
pub use analysis::result::{
    AnalysisRecord, BasicInfo, Key, ProductionInsights, RhythmSummary, SpectralSummary,
    TimbreSummary,
};
pub use cluster::{cluster, cluster_with_config, ClusterConfig, ClusterResult, ClusterSummary, FeatureSet};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::key::KeyStrategy;
pub use io::{load, AudioBuffer};

use std::path::Path;

/// Main analysis function
///
/// Analyzes in-memory mono samples and returns the validated record. Samples
/// at a rate other than `config.sample_rate` are resampled first.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisRecord` with tempo, key, spectral, rhythm, timbre and production sections
///
/// # Errors
///
/// - `AnalysisError::InvalidInput` for a zero sample rate or inconsistent configuration
/// - `AnalysisError::InsufficientSamples` if the (resampled) buffer is shorter than one frame
///
/// # Example
///
/// ```no_run
/// use soundprint::{analyze_audio, AnalysisConfig};
///
/// let samples = vec![0.0f32; 22050 * 5]; // 5 seconds of silence
/// let record = analyze_audio(&samples, 22050, &AnalysisConfig::default())?;
/// assert_eq!(record.harmonic_ratio(), 0.0);
/// # Ok::<(), soundprint::AnalysisError>(())
/// ```
pub fn analyze_audio(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<AnalysisRecord, AnalysisError> {
    config.validate()?;
    let buffer = AudioBuffer::new(samples.to_vec(), sample_rate)?.resample(config.sample_rate)?;
    analyze_buffer(&buffer, config)
}

/// Decode a file and analyze it
///
/// # Errors
///
/// - `AnalysisError::DecodeError` if the file cannot be opened or decoded
/// - Any error from [`analyze_audio`]
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
) -> Result<AnalysisRecord, AnalysisError> {
    config.validate()?;
    let buffer = load(path, config)?;
    analyze_buffer(&buffer, config)
}

/// Analyze a buffer at its own sample rate
///
/// # Errors
///
/// - `AnalysisError::InsufficientSamples` if the buffer is shorter than one frame
/// - `AnalysisError::InvalidInput` for an inconsistent configuration
pub fn analyze_buffer(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisRecord, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting audio analysis: {} samples at {} Hz",
        buffer.len(),
        buffer.sample_rate()
    );

    let features = features::extract(buffer, config)?;
    let descriptors = analysis::descriptors::estimate(&features, config)?;
    let record = analysis::aggregate(&features, &descriptors, config)?;

    log::debug!(
        "Analysis finished in {:.1} ms",
        start_time.elapsed().as_secs_f32() * 1000.0
    );

    Ok(record)
}
