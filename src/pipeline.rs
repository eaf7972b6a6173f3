//! The explicit clustering pipeline
//!
//! One call runs extraction → normalization → clustering → assembly for a
//! single state and parameter set. Every stage is a pure function of its
//! input; nothing is retained between runs, so independent runs may execute
//! concurrently without coordination.

use ndarray::Array2;

use crate::assign::{assemble_groups, ClusterAssignment};
use crate::data::{extract_features, normalize_features, CountyRecord, StateCrosswalk};
use crate::distance::{pairwise_distances, MetricKind};
use crate::error::Result;
use crate::model::{FuzzyCMeans, KMedoids, DEFAULT_MAX_ITERS, DEFAULT_TOLERANCE};

/// Clustering algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Soft clustering on feature vectors, hardened by arg-max.
    FuzzyCMeans,
    /// Hard partitioning on the pairwise distance matrix.
    KMedoids,
}

/// Parameters for a single clustering run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Two-letter state postal code.
    pub state: String,
    /// Which clusterer to run.
    pub algorithm: Algorithm,
    /// Number of groups K (≥ 2).
    pub clusters: usize,
    /// Fuzziness exponent (fuzzy c-means only).
    pub fuzziness: f64,
    /// Distance metric for the distance matrix and center distances.
    pub metric: MetricKind,
    /// Seed for fuzzy c-means initialization; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Iteration cap for either clusterer.
    pub max_iters: usize,
    /// Convergence tolerance (fuzzy c-means only).
    pub tolerance: f64,
}

impl PipelineConfig {
    /// Config with default metric, fuzziness 2.0, and default iteration
    /// bounds.
    pub fn new(state: impl Into<String>, algorithm: Algorithm, clusters: usize) -> Self {
        Self {
            state: state.into(),
            algorithm,
            clusters,
            fuzziness: 2.0,
            metric: MetricKind::default(),
            seed: None,
            max_iters: DEFAULT_MAX_ITERS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Everything a caller needs after a run: the FIPS → group mapping for the
/// renderer, plus the per-county data backing it for reports and plots.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// County → group mapping (1-based labels), keyed by 5-character FIPS.
    pub assignment: ClusterAssignment,
    /// FIPS strings in input order.
    pub fips: Vec<String>,
    /// Area names in input order.
    pub names: Vec<String>,
    /// Normalized feature matrix, shape (3, n).
    pub normalized: Array2<f64>,
    /// 0-based hard labels in input order.
    pub labels: Vec<usize>,
}

/// Run the full pipeline for one state and parameter set.
pub fn run_pipeline(
    records: &[CountyRecord],
    crosswalk: &StateCrosswalk,
    config: &PipelineConfig,
) -> Result<PipelineOutcome> {
    let features = extract_features(records, &config.state, crosswalk)?;
    let normalized = normalize_features(&features.raw)?;

    let labels = match config.algorithm {
        Algorithm::FuzzyCMeans => {
            let mut clusterer = FuzzyCMeans::new(config.clusters, config.fuzziness)
                .with_max_iters(config.max_iters)
                .with_tolerance(config.tolerance);
            if let Some(seed) = config.seed {
                clusterer = clusterer.with_seed(seed);
            }
            clusterer.fit(&normalized, &config.metric)?.harden()
        }
        Algorithm::KMedoids => {
            let distances = pairwise_distances(&normalized, &config.metric);
            KMedoids::new(config.clusters)
                .with_max_iters(config.max_iters)
                .fit(&distances)?
                .labels
        }
    };

    let assignment = assemble_groups(&features.fips, &labels)?;

    Ok(PipelineOutcome {
        assignment,
        fips: features.fips,
        names: features.names,
        normalized,
        labels,
    })
}
