//! Command-line interface definitions and argument parsing

use clap::{Parser, ValueEnum};

use crate::distance::MetricKind;
use crate::pipeline::{Algorithm, PipelineConfig};

/// County economic segmentation CLI using fuzzy c-means or k-medoids
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "qcew.csv")]
    pub input: String,

    /// Two-letter state postal code to cluster (e.g. MD)
    #[arg(short, long)]
    pub state: String,

    /// Clustering algorithm
    #[arg(short, long, value_enum, default_value = "k-medoids")]
    pub algorithm: AlgorithmArg,

    /// Number of groups
    #[arg(short = 'k', long, default_value = "4")]
    pub clusters: usize,

    /// Fuzziness exponent (fuzzy c-means only, must be > 1.0)
    #[arg(short = 'm', long, default_value = "2.0")]
    pub fuzziness: f64,

    /// Distance metric
    #[arg(long, value_enum, default_value = "euclidean")]
    pub metric: MetricArg,

    /// Seed for reproducible fuzzy c-means initialization
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum iterations for either clusterer
    #[arg(long, default_value = "300")]
    pub max_iters: usize,

    /// Convergence tolerance for fuzzy c-means
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Output path for the group scatter plot
    #[arg(short, long, default_value = "county_groups.png")]
    pub output: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Algorithm choice as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Soft clustering hardened by arg-max
    FuzzyCMeans,
    /// Hard partitioning on the distance matrix
    KMedoids,
}

/// Metric choice as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Euclidean (L2) distance
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
}

impl Args {
    /// Build the pipeline configuration from the parsed arguments.
    pub fn to_config(&self) -> PipelineConfig {
        let algorithm = match self.algorithm {
            AlgorithmArg::FuzzyCMeans => Algorithm::FuzzyCMeans,
            AlgorithmArg::KMedoids => Algorithm::KMedoids,
        };
        let metric = match self.metric {
            MetricArg::Euclidean => MetricKind::Euclidean,
            MetricArg::Manhattan => MetricKind::Manhattan,
        };

        PipelineConfig {
            state: self.state.clone(),
            algorithm,
            clusters: self.clusters,
            fuzziness: self.fuzziness,
            metric,
            seed: self.seed,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
        }
    }
}
