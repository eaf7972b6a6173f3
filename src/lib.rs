//! CountyCluster: grouping counties by economic profile
//!
//! This library clusters the counties of a U.S. state using normalized
//! industry/employment statistics (establishment count, average employment,
//! average weekly wage), via fuzzy c-means or k-medoids, and produces a
//! FIPS → group mapping for a downstream choropleth renderer.

pub mod assign;
pub mod cli;
pub mod data;
pub mod distance;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod viz;

// Re-export public items for easier access
pub use assign::{assemble_groups, ClusterAssignment};
pub use cli::Args;
pub use data::{
    extract_features, load_records, normalize_features, CountyFeatures, CountyRecord,
    StateCrosswalk,
};
pub use distance::{pairwise_distances, Metric, MetricKind};
pub use error::{PipelineError, Result};
pub use model::{FuzzyCMeans, FuzzyFit, KMedoids, KMedoidsFit};
pub use pipeline::{run_pipeline, Algorithm, PipelineConfig, PipelineOutcome};
