//! Distance metrics and pairwise dissimilarity matrices
//!
//! The metric is pluggable: anything implementing [`Metric`] can drive both
//! the distance matrix used by k-medoids and the center distances used by
//! fuzzy c-means. [`MetricKind`] covers the built-in choices.

use ndarray::{Array2, ArrayView1};

/// A dissimilarity function over feature vectors.
///
/// Implementations must be non-negative and symmetric; the triangle
/// inequality is the implementor's responsibility if k-medoids quality
/// guarantees matter.
pub trait Metric {
    /// Distance between two feature vectors of equal length.
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;
}

/// Built-in distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricKind {
    /// Euclidean (L2) distance. The default, and the one exercised end-to-end.
    #[default]
    Euclidean,
    /// Manhattan (L1) distance. More robust to single-feature outliers.
    Manhattan,
}

impl Metric for MetricKind {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Manhattan => manhattan_distance(a, b),
        }
    }
}

/// Euclidean (L2) distance between two vectors.
pub fn euclidean_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Manhattan (L1) distance between two vectors.
pub fn manhattan_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Build the full pairwise distance matrix for a (features × counties) matrix.
///
/// Columns are the points. The result is n×n with a zero diagonal, filled
/// symmetrically so `D[i][j] == D[j][i]` holds exactly.
pub fn pairwise_distances<M: Metric + ?Sized>(features: &Array2<f64>, metric: &M) -> Array2<f64> {
    let n = features.ncols();
    let mut distances = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = metric.distance(features.column(i), features.column(j));
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}
