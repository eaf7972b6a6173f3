//! Typed errors for the clustering pipeline
//!
//! Every failure mode of the core pipeline is a distinct variant so callers
//! can match on which stage failed. Nothing in the core retries or swallows
//! an error; all variants propagate to the caller.

use thiserror::Error;

/// Errors produced by the clustering pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested state postal code is not present in the crosswalk.
    #[error("state code '{0}' not found in the state crosswalk")]
    NoMatchingState(String),

    /// Filtering left zero county rows for the requested state.
    #[error("no county rows remain for state '{state}' after filtering")]
    EmptyDataset { state: String },

    /// A feature row has zero variance across the state's counties.
    ///
    /// The source data can legitimately trigger this for very small states;
    /// the pipeline fails loudly instead of propagating NaN through the
    /// normalization step.
    #[error("feature '{feature}' has zero variance across the selected counties")]
    DegenerateFeature { feature: String },

    /// An iterative clusterer hit its iteration cap before converging.
    ///
    /// `best_effort` holds the hardened labels from the final iteration so
    /// callers can still inspect the partial result; it is never treated as
    /// a successful assignment.
    #[error("{algorithm} failed to converge after {iterations} iterations")]
    ConvergenceFailure {
        algorithm: &'static str,
        iterations: usize,
        best_effort: Vec<usize>,
    },

    /// County identifier count does not match the clustered row count.
    ///
    /// This is an internal invariant violation, not a user error.
    #[error("county identifier count ({identifiers}) does not match clustered row count ({labels})")]
    AssemblyMismatch { identifiers: usize, labels: usize },

    /// A caller-supplied parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;
