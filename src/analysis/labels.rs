//! Qualitative labels derived from numeric descriptors
//!
//! One threshold table drives both the rhythm complexity label and the
//! timbre description.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thresholds for rhythm and timbre labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    /// Complexity ratios below this are "simple/steady" (default: 0.3)
    pub rhythm_simple_below: f32,

    /// Complexity ratios below this (and not simple) are "moderate" (default: 0.6)
    pub rhythm_moderate_below: f32,

    /// Harmonic ratios above this read as "rich harmonic content" (default: 0.7)
    pub harmonic_rich_above: f32,

    /// Harmonic ratios below this read as "percussive/rhythmic" (default: 0.3)
    pub percussive_below: f32,

    /// Mean centroids above this read as "bright" (default: 5000 Hz)
    pub bright_centroid_above: f32,

    /// Mean centroids below this read as "warm" (default: 2000 Hz)
    pub warm_centroid_below: f32,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            rhythm_simple_below: 0.3,
            rhythm_moderate_below: 0.6,
            harmonic_rich_above: 0.7,
            percussive_below: 0.3,
            bright_centroid_above: 5000.0,
            warm_centroid_below: 2000.0,
        }
    }
}

impl LabelThresholds {
    /// Check that every threshold is finite and each pair is ordered
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let values = [
            self.rhythm_simple_below,
            self.rhythm_moderate_below,
            self.harmonic_rich_above,
            self.percussive_below,
            self.bright_centroid_above,
            self.warm_centroid_below,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput(
                "label thresholds must be finite".to_string(),
            ));
        }
        if self.rhythm_simple_below > self.rhythm_moderate_below {
            return Err(AnalysisError::InvalidInput(format!(
                "rhythm_simple_below ({}) exceeds rhythm_moderate_below ({})",
                self.rhythm_simple_below, self.rhythm_moderate_below
            )));
        }
        if self.percussive_below > self.harmonic_rich_above {
            return Err(AnalysisError::InvalidInput(format!(
                "percussive_below ({}) exceeds harmonic_rich_above ({})",
                self.percussive_below, self.harmonic_rich_above
            )));
        }
        if self.warm_centroid_below > self.bright_centroid_above {
            return Err(AnalysisError::InvalidInput(format!(
                "warm_centroid_below ({}) exceeds bright_centroid_above ({})",
                self.warm_centroid_below, self.bright_centroid_above
            )));
        }
        Ok(())
    }
}

/// Rhythm complexity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhythmComplexity {
    /// Onset strength varies little around its mean
    #[serde(rename = "simple/steady")]
    Simple,
    /// In between
    #[serde(rename = "moderate")]
    Moderate,
    /// Onset strength varies strongly
    #[serde(rename = "complex/dynamic")]
    Complex,
}

impl RhythmComplexity {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RhythmComplexity::Simple => "simple/steady",
            RhythmComplexity::Moderate => "moderate",
            RhythmComplexity::Complex => "complex/dynamic",
        }
    }

    /// Classify a complexity ratio
    pub fn classify(ratio: f32, thresholds: &LabelThresholds) -> Self {
        if ratio < thresholds.rhythm_simple_below {
            RhythmComplexity::Simple
        } else if ratio < thresholds.rhythm_moderate_below {
            RhythmComplexity::Moderate
        } else {
            RhythmComplexity::Complex
        }
    }
}

impl fmt::Display for RhythmComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coefficient of variation of the onset envelope: `std / mean`
///
/// 0 when the mean is 0 (silence).
pub fn rhythm_complexity_ratio(onset_mean: f32, onset_std: f32) -> f32 {
    if onset_mean <= 0.0 {
        return 0.0;
    }
    onset_std / onset_mean
}

/// Describe timbre from the harmonic ratio and mean spectral centroid
///
/// Matched phrases are joined with " and "; "balanced" when none match.
pub fn timbre_description(
    harmonic_ratio: f32,
    centroid_mean: f32,
    thresholds: &LabelThresholds,
) -> String {
    let mut phrases = Vec::with_capacity(2);

    if harmonic_ratio > thresholds.harmonic_rich_above {
        phrases.push("rich harmonic content");
    } else if harmonic_ratio < thresholds.percussive_below {
        phrases.push("percussive/rhythmic");
    }

    if centroid_mean > thresholds.bright_centroid_above {
        phrases.push("bright");
    } else if centroid_mean < thresholds.warm_centroid_below {
        phrases.push("warm");
    }

    if phrases.is_empty() {
        "balanced".to_string()
    } else {
        phrases.join(" and ")
    }
}

/// Format a duration in seconds as `m:ss`
pub fn format_duration(seconds: f32) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
