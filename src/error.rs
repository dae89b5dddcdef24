//! Error types for the analysis and clustering engine

use thiserror::Error;

/// Errors that can occur during audio analysis or clustering
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// File unreadable, unsupported format, or decodes to no samples
    #[error("Decoding error: {0}")]
    DecodeError(String),

    /// Buffer is shorter than one analysis window
    #[error("Insufficient samples: got {samples}, need at least {required} (one analysis window)")]
    InsufficientSamples {
        /// Number of samples in the buffer
        samples: usize,
        /// Minimum number of samples required
        required: usize,
    },

    /// Requested cluster count is outside `1..=records`
    #[error("Invalid cluster count: k = {k} must satisfy 1 <= k <= {records} (number of records)")]
    InvalidClusterCount {
        /// Requested cluster count
        k: usize,
        /// Number of records supplied
        records: usize,
    },

    /// Clustering called without any records
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid input parameters (configuration or record validation)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Processing error during analysis (FFT planning, resampling)
    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AnalysisError::DecodeError(err.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AnalysisError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AnalysisError::ProcessingError(format!("resampler construction failed: {}", err))
    }
}

impl From<rubato::ResampleError> for AnalysisError {
    fn from(err: rubato::ResampleError) -> Self {
        AnalysisError::ProcessingError(format!("resampling failed: {}", err))
    }
}
