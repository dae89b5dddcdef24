//! Clustering engine
//!
//! Groups analysis records by musical character:
//! - Feature matrix from a fixed set of descriptor columns
//! - Per-call z-score standardization
//! - Seeded k-means with k-means++ initialization
//! - Per-cluster summaries over the raw (unscaled) descriptors

pub mod feature_matrix;
pub mod kmeans;
pub mod scaler;

pub use feature_matrix::FeatureSet;

use crate::analysis::result::AnalysisRecord;
use crate::analysis::stats;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Clustering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters (default: 3)
    pub k: usize,

    /// Descriptor columns (default: canonical four)
    pub feature_set: FeatureSet,

    /// Z-score the columns before clustering (default: true)
    pub standardize: bool,

    /// Base seed for k-means++ (default: 42)
    pub seed: u64,

    /// Number of restarts; the lowest-inertia run wins (default: 10)
    pub n_init: usize,

    /// Maximum Lloyd iterations per run (default: 300)
    pub max_iterations: usize,

    /// Include the final centroids in the result (default: false)
    pub keep_centroids: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 3,
            feature_set: FeatureSet::Canonical,
            standardize: true,
            seed: 42,
            n_init: 10,
            max_iterations: 300,
            keep_centroids: false,
        }
    }
}

/// Summary of one cluster over raw descriptor values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster index
    pub index: usize,

    /// Number of records in the cluster
    pub size: usize,

    /// Mean tempo of the members in BPM (0 for an empty cluster)
    pub mean_tempo: f32,

    /// Mean spectral centroid of the members in Hz (0 for an empty cluster)
    pub mean_centroid: f32,
}

/// Outcome of clustering a set of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// Cluster index per record, in input order
    pub assignments: Vec<usize>,

    /// One summary per cluster, by index
    pub summaries: Vec<ClusterSummary>,

    /// Sum of squared distances to the assigned centroids (in clustering space)
    pub inertia: f64,

    /// Lloyd iterations of the winning run
    pub iterations: usize,

    /// Columns the records were clustered on
    pub feature_set: FeatureSet,

    /// Final centroids in clustering space, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroids: Option<Vec<Vec<f64>>>,
}

/// Cluster records into `k` groups with the default configuration
///
/// # Errors
///
/// - `AnalysisError::EmptyInput` when `records` is empty
/// - `AnalysisError::InvalidClusterCount` when `k == 0` or `k > records.len()`
///
/// # Example
///
/// ```no_run
/// use soundprint::{analyze_file, cluster, AnalysisConfig};
///
/// let config = AnalysisConfig::default();
/// let records = ["a.wav", "b.wav", "c.wav"]
///     .iter()
///     .map(|p| analyze_file(p, &config))
///     .collect::<Result<Vec<_>, _>>()?;
/// let result = cluster(&records, 2)?;
/// println!("{:?}", result.assignments);
/// # Ok::<(), soundprint::AnalysisError>(())
/// ```
pub fn cluster(records: &[AnalysisRecord], k: usize) -> Result<ClusterResult, AnalysisError> {
    cluster_with_config(
        records,
        &ClusterConfig {
            k,
            ..ClusterConfig::default()
        },
    )
}

/// Cluster records with an explicit configuration
///
/// # Errors
///
/// - `AnalysisError::EmptyInput` when `records` is empty
/// - `AnalysisError::InvalidClusterCount` when `k == 0` or `k > records.len()`
/// - `AnalysisError::InvalidInput` when `n_init` or `max_iterations` is 0
pub fn cluster_with_config(
    records: &[AnalysisRecord],
    config: &ClusterConfig,
) -> Result<ClusterResult, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "clustering needs at least one record".to_string(),
        ));
    }
    if config.k == 0 || config.k > records.len() {
        return Err(AnalysisError::InvalidClusterCount {
            k: config.k,
            records: records.len(),
        });
    }
    if config.n_init == 0 || config.max_iterations == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "n_init and max_iterations must be > 0 (got {} / {})",
            config.n_init, config.max_iterations
        )));
    }

    log::debug!(
        "Clustering {} records into {} clusters ({:?}, standardize={}, seed={})",
        records.len(),
        config.k,
        config.feature_set,
        config.standardize,
        config.seed
    );

    let matrix = feature_matrix::build_matrix(records, config.feature_set);
    let data = if config.standardize {
        scaler::standardize(&matrix)
    } else {
        matrix
    };

    let fit = kmeans::fit(
        &data,
        config.k,
        config.seed,
        config.n_init,
        config.max_iterations,
    );

    let summaries = (0..config.k)
        .map(|index| {
            let members: Vec<&AnalysisRecord> = records
                .iter()
                .zip(&fit.assignments)
                .filter(|(_, &a)| a == index)
                .map(|(r, _)| r)
                .collect();
            if members.is_empty() {
                log::warn!("Cluster {} has no members", index);
            }
            let tempos: Vec<f32> = members.iter().map(|r| r.tempo()).collect();
            let centroids: Vec<f32> = members.iter().map(|r| r.spectral().centroid_mean).collect();
            ClusterSummary {
                index,
                size: members.len(),
                mean_tempo: stats::mean(&tempos),
                mean_centroid: stats::mean(&centroids),
            }
        })
        .collect();

    log::debug!(
        "Clustering done: inertia {:.6}, {} iterations",
        fit.inertia,
        fit.iterations
    );

    Ok(ClusterResult {
        assignments: fit.assignments,
        summaries,
        inertia: fit.inertia,
        iterations: fit.iterations,
        feature_set: config.feature_set,
        centroids: config.keep_centroids.then_some(fit.centroids),
    })
}
