//! Key detection
//!
//! Detect the musical key of a track by matching its mean chroma profile
//! against binary diatonic templates for all 24 keys.

pub mod detector;
pub mod templates;

pub use detector::detect_key;
pub use templates::KeyTemplates;

use crate::analysis::result::Key;
use serde::{Deserialize, Serialize};

/// How the 24 templates are matched against the chroma profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Pearson correlation against every rotated template; best of 24 wins
    #[default]
    RotationSearch,

    /// Root is the strongest pitch class; mode is whichever C-rooted
    /// template correlates better with the profile
    ArgmaxRoot,
}

/// Key detection result
#[derive(Debug, Clone)]
pub struct KeyDetectionResult {
    /// Detected key (best match)
    pub key: Key,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    /// All 24 key scores (ranked, highest first)
    pub all_scores: Vec<(Key, f32)>,
}
