//! Feature matrix construction
//!
//! Selects one row of descriptor columns per record.

use crate::analysis::result::AnalysisRecord;
use serde::{Deserialize, Serialize};

/// Descriptor columns used for clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// `[tempo, centroid_mean, bandwidth_mean, onset_strength_mean]`
    #[default]
    Canonical,

    /// `[tempo, centroid_mean, rolloff_mean, bandwidth_mean, onset_strength_mean, harmonic_ratio]`
    Extended,
}

impl FeatureSet {
    /// Column names in matrix order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            FeatureSet::Canonical => &["tempo", "centroid_mean", "bandwidth_mean", "onset_strength_mean"],
            FeatureSet::Extended => &[
                "tempo",
                "centroid_mean",
                "rolloff_mean",
                "bandwidth_mean",
                "onset_strength_mean",
                "harmonic_ratio",
            ],
        }
    }

    /// Feature row of one record
    pub fn row(&self, record: &AnalysisRecord) -> Vec<f64> {
        let spectral = record.spectral();
        let onset = record.rhythm().onset_strength_mean;
        let row = match self {
            FeatureSet::Canonical => vec![
                record.tempo(),
                spectral.centroid_mean,
                spectral.bandwidth_mean,
                onset,
            ],
            FeatureSet::Extended => vec![
                record.tempo(),
                spectral.centroid_mean,
                spectral.rolloff_mean,
                spectral.bandwidth_mean,
                onset,
                record.harmonic_ratio(),
            ],
        };
        row.into_iter().map(f64::from).collect()
    }
}

/// Build the feature matrix, one row per record in input order
pub fn build_matrix(records: &[AnalysisRecord], feature_set: FeatureSet) -> Vec<Vec<f64>> {
    records.iter().map(|r| feature_set.row(r)).collect()
}
