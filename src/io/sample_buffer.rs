//! Immutable mono sample buffer handed between pipeline stages

use crate::error::AnalysisError;
use crate::preprocessing::resample::resample;

/// Decoded mono audio at a known sample rate
///
/// Owned by the analysis call that created it; stages only borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Mono samples, nominally in [-1.0, 1.0]
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap mono samples recorded at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `sample_rate` is 0
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Sample sequence
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (sample count / sample rate)
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Return a copy of this buffer at `target_rate`
    ///
    /// A buffer already at `target_rate` is cloned unchanged.
    pub fn resample(&self, target_rate: u32) -> Result<Self, AnalysisError> {
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }
        let samples = resample(&self.samples, self.sample_rate, target_rate)?;
        Self::new(samples, target_rate)
    }

    /// Consume the buffer, returning its samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
