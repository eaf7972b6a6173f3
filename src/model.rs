//! Fuzzy c-means and k-medoids clustering
//!
//! Both algorithms are iteration-capped and fully reproducible: fuzzy
//! c-means takes an optional seed for its initial center sampling, and
//! k-medoids uses a deterministic greedy BUILD initialization so it needs no
//! randomness at all. All tie-breaks resolve to the lowest index.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use crate::distance::Metric;
use crate::error::{PipelineError, Result};

/// Default iteration cap for both clusterers.
pub const DEFAULT_MAX_ITERS: usize = 300;
/// Default convergence tolerance for fuzzy c-means weight changes.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Harden soft membership weights into one label per row.
///
/// Arg-max with strict `>`, so equal maxima resolve to the lowest column
/// index.
pub fn harden_weights(weights: &Array2<f64>) -> Vec<usize> {
    weights
        .outer_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &w) in row.iter().enumerate() {
                if w > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Fuzzy c-means configuration.
///
/// Operates on raw (normalized) feature vectors, not a distance matrix.
#[derive(Debug, Clone)]
pub struct FuzzyCMeans {
    /// Number of clusters C (≥ 2).
    pub clusters: usize,
    /// Fuzziness exponent m (> 1.0); larger values soften the partition.
    pub fuzziness: f64,
    /// Iteration cap.
    pub max_iters: usize,
    /// Convergence threshold on the max absolute membership change.
    pub tolerance: f64,
    /// Seed for initial center sampling; `None` draws from entropy.
    pub seed: Option<u64>,
}

/// A converged fuzzy c-means fit.
#[derive(Debug, Clone)]
pub struct FuzzyFit {
    /// Membership weights, shape (n, C); each row sums to 1.
    pub weights: Array2<f64>,
    /// Cluster centers, shape (features, C).
    pub centers: Array2<f64>,
    /// Iterations used until convergence.
    pub iterations: usize,
}

impl FuzzyFit {
    /// Hard labels via per-county arg-max (lowest index wins ties).
    pub fn harden(&self) -> Vec<usize> {
        harden_weights(&self.weights)
    }
}

impl FuzzyCMeans {
    /// Create a clusterer with default iteration cap and tolerance.
    pub fn new(clusters: usize, fuzziness: f64) -> Self {
        Self {
            clusters,
            fuzziness,
            max_iters: DEFAULT_MAX_ITERS,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
        }
    }

    /// Fix the initialization seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Customize the iteration cap.
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Customize the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Run the fuzzy c-means iteration on a (features × counties) matrix.
    ///
    /// Initial centers are C distinct county columns sampled with the
    /// configured seed. Each round recomputes memberships from center
    /// distances raised to 2/(m−1), then centers as m-power weighted
    /// centroids, until the largest membership change drops below the
    /// tolerance. Exceeding the iteration cap is a
    /// [`PipelineError::ConvergenceFailure`] carrying the best-effort
    /// hardened labels.
    pub fn fit(&self, features: &Array2<f64>, metric: &dyn Metric) -> Result<FuzzyFit> {
        let n = features.ncols();
        let dims = features.nrows();
        if self.clusters < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "cluster count must be at least 2, got {}",
                self.clusters
            )));
        }
        if self.fuzziness <= 1.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "fuzziness exponent must be greater than 1.0, got {}",
                self.fuzziness
            )));
        }
        if n < self.clusters {
            return Err(PipelineError::InvalidParameter(format!(
                "{} counties cannot form {} clusters",
                n, self.clusters
            )));
        }

        let c = self.clusters;
        let mut rng = make_rng(self.seed);
        let mut init: Vec<usize> = sample(&mut rng, n, c).into_vec();
        init.sort_unstable();

        let mut centers = Array2::zeros((dims, c));
        for (j, &i) in init.iter().enumerate() {
            centers.column_mut(j).assign(&features.column(i));
        }

        let exponent = 2.0 / (self.fuzziness - 1.0);
        let mut weights: Array2<f64> = Array2::zeros((n, c));

        for iteration in 1..=self.max_iters {
            // Membership update from current centers.
            let mut next = Array2::zeros((n, c));
            for i in 0..n {
                let dists: Vec<f64> = (0..c)
                    .map(|j| metric.distance(features.column(i), centers.column(j)))
                    .collect();
                if let Some(hit) = dists.iter().position(|&d| d < f64::EPSILON) {
                    // Coincident with a center: full membership in the
                    // lowest such cluster index.
                    next[[i, hit]] = 1.0;
                } else {
                    for j in 0..c {
                        let denom: f64 =
                            dists.iter().map(|&dk| (dists[j] / dk).powf(exponent)).sum();
                        next[[i, j]] = 1.0 / denom;
                    }
                }
            }

            let shift = next
                .iter()
                .zip(weights.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            weights = next;

            // Center update: m-power weighted centroids.
            for j in 0..c {
                let mut numerator = Array1::zeros(dims);
                let mut denominator = 0.0;
                for i in 0..n {
                    let w = weights[[i, j]].powf(self.fuzziness);
                    numerator.scaled_add(w, &features.column(i));
                    denominator += w;
                }
                centers.column_mut(j).assign(&(numerator / denominator));
            }

            if shift < self.tolerance {
                return Ok(FuzzyFit {
                    weights,
                    centers,
                    iterations: iteration,
                });
            }
        }

        Err(PipelineError::ConvergenceFailure {
            algorithm: "fuzzy c-means",
            iterations: self.max_iters,
            best_effort: harden_weights(&weights),
        })
    }
}

/// K-medoids configuration.
///
/// Operates directly on a precomputed distance matrix; initialization is the
/// greedy BUILD step from PAM, which is deterministic, so repeated runs on
/// the same matrix always agree.
#[derive(Debug, Clone)]
pub struct KMedoids {
    /// Number of clusters k (≥ 2).
    pub clusters: usize,
    /// Iteration cap.
    pub max_iters: usize,
}

/// A converged k-medoids fit.
#[derive(Debug, Clone)]
pub struct KMedoidsFit {
    /// Hard cluster label per county, in 0..k.
    pub labels: Vec<usize>,
    /// County index serving as each cluster's medoid.
    pub medoids: Vec<usize>,
    /// Iterations used until convergence.
    pub iterations: usize,
}

impl KMedoids {
    /// Create a clusterer with the default iteration cap.
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    /// Customize the iteration cap.
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Cluster a square distance matrix into k groups.
    ///
    /// Alternates nearest-medoid assignment with medoid recomputation (the
    /// member minimizing total intra-cluster distance) until neither changes.
    /// Equidistant choices resolve to the lowest index.
    pub fn fit(&self, distances: &Array2<f64>) -> Result<KMedoidsFit> {
        let n = distances.nrows();
        if distances.ncols() != n {
            return Err(PipelineError::InvalidParameter(format!(
                "distance matrix must be square, got {}x{}",
                n,
                distances.ncols()
            )));
        }
        if self.clusters < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "cluster count must be at least 2, got {}",
                self.clusters
            )));
        }
        if n < self.clusters {
            return Err(PipelineError::InvalidParameter(format!(
                "{} counties cannot form {} clusters",
                n, self.clusters
            )));
        }

        let k = self.clusters;
        let mut medoids = build_initial_medoids(distances, k);
        let mut labels = assign_to_medoids(distances, &medoids);

        for iteration in 1..=self.max_iters {
            let mut next_medoids = medoids.clone();
            for (j, slot) in next_medoids.iter_mut().enumerate() {
                let members: Vec<usize> = labels
                    .iter()
                    .enumerate()
                    .filter(|&(_, &label)| label == j)
                    .map(|(i, _)| i)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                let mut best = members[0];
                let mut best_cost = f64::INFINITY;
                for &candidate in &members {
                    let cost: f64 = members
                        .iter()
                        .map(|&other| distances[[candidate, other]])
                        .sum();
                    if cost < best_cost {
                        best_cost = cost;
                        best = candidate;
                    }
                }
                *slot = best;
            }

            let next_labels = assign_to_medoids(distances, &next_medoids);
            if next_medoids == medoids && next_labels == labels {
                return Ok(KMedoidsFit {
                    labels,
                    medoids,
                    iterations: iteration,
                });
            }
            medoids = next_medoids;
            labels = next_labels;
        }

        Err(PipelineError::ConvergenceFailure {
            algorithm: "k-medoids",
            iterations: self.max_iters,
            best_effort: labels,
        })
    }
}

/// Greedy BUILD initialization: the first medoid minimizes total distance to
/// all counties, each further medoid maximizes the assignment-cost reduction.
fn build_initial_medoids(distances: &Array2<f64>, k: usize) -> Vec<usize> {
    let n = distances.nrows();

    let mut first = 0;
    let mut first_cost = f64::INFINITY;
    for i in 0..n {
        let cost = distances.row(i).sum();
        if cost < first_cost {
            first_cost = cost;
            first = i;
        }
    }
    let mut medoids = vec![first];

    while medoids.len() < k {
        let mut best_candidate = 0;
        let mut best_gain = f64::NEG_INFINITY;
        for candidate in 0..n {
            if medoids.contains(&candidate) {
                continue;
            }
            let gain: f64 = (0..n)
                .map(|j| {
                    let current = medoids
                        .iter()
                        .map(|&m| distances[[j, m]])
                        .fold(f64::INFINITY, f64::min);
                    (current - distances[[j, candidate]]).max(0.0)
                })
                .sum();
            if gain > best_gain {
                best_gain = gain;
                best_candidate = candidate;
            }
        }
        medoids.push(best_candidate);
    }

    medoids.sort_unstable();
    medoids
}

/// Assign every county to its nearest medoid (strict `<`, so equidistant
/// medoids resolve to the lowest cluster index).
pub fn assign_to_medoids(distances: &Array2<f64>, medoids: &[usize]) -> Vec<usize> {
    (0..distances.nrows())
        .map(|i| {
            let mut best = 0;
            for (j, &medoid) in medoids.iter().enumerate() {
                if distances[[i, medoid]] < distances[[i, medoids[best]]] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize_features;
    use crate::distance::{pairwise_distances, MetricKind};
    use ndarray::Array2;

    /// Two near-identical counties and one outlier, z-scored.
    fn three_county_features() -> Array2<f64> {
        let raw = Array2::from_shape_vec(
            (3, 3),
            vec![
                10.0, 12.0, 500.0, //
                100.0, 110.0, 5000.0, //
                500.0, 520.0, 900.0,
            ],
        )
        .unwrap();
        normalize_features(&raw).unwrap()
    }

    #[test]
    fn test_fcm_weights_sum_to_one() {
        let features = three_county_features();
        let fit = FuzzyCMeans::new(2, 2.0)
            .with_seed(7)
            .fit(&features, &MetricKind::Euclidean)
            .unwrap();

        assert_eq!(fit.weights.shape(), &[3, 2]);
        for row in fit.weights.outer_iter() {
            let sum: f64 = row.sum();
            assert!((sum - 1.0).abs() < 1e-9, "weights sum to {}", sum);
            assert!(row.iter().all(|&w| (0.0..=1.0).contains(&w)));
        }
    }

    #[test]
    fn test_fcm_outlier_dominates_its_cluster() {
        let features = three_county_features();
        let fit = FuzzyCMeans::new(2, 2.0)
            .with_seed(7)
            .fit(&features, &MetricKind::Euclidean)
            .unwrap();

        let labels = fit.harden();
        assert_eq!(labels[0], labels[1]);
        assert_ne!(labels[0], labels[2]);

        let outlier_weight = fit.weights[[2, labels[2]]];
        assert!(outlier_weight > 0.9, "outlier weight {}", outlier_weight);

        // The two near-identical counties hold near-equal, high weight for
        // the shared cluster.
        let w0 = fit.weights[[0, labels[0]]];
        let w1 = fit.weights[[1, labels[1]]];
        assert!(w0 > 0.7 && w1 > 0.7);
        assert!((w0 - w1).abs() < 0.05);
    }

    #[test]
    fn test_fcm_deterministic_with_seed() {
        let features = three_county_features();
        let clusterer = FuzzyCMeans::new(2, 2.0).with_seed(42);
        let a = clusterer.fit(&features, &MetricKind::Euclidean).unwrap();
        let b = clusterer.fit(&features, &MetricKind::Euclidean).unwrap();

        assert_eq!(a.iterations, b.iterations);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.harden(), b.harden());
    }

    #[test]
    fn test_fcm_invalid_parameters() {
        let features = three_county_features();
        assert!(matches!(
            FuzzyCMeans::new(1, 2.0).fit(&features, &MetricKind::Euclidean),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            FuzzyCMeans::new(2, 1.0).fit(&features, &MetricKind::Euclidean),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            FuzzyCMeans::new(4, 2.0).fit(&features, &MetricKind::Euclidean),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_fcm_convergence_failure_carries_best_effort() {
        let features = three_county_features();
        let err = FuzzyCMeans::new(2, 2.0)
            .with_seed(7)
            .with_max_iters(1)
            .fit(&features, &MetricKind::Euclidean)
            .unwrap_err();

        match err {
            PipelineError::ConvergenceFailure {
                algorithm,
                iterations,
                best_effort,
            } => {
                assert_eq!(algorithm, "fuzzy c-means");
                assert_eq!(iterations, 1);
                assert_eq!(best_effort.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_harden_lowest_index_wins_ties() {
        let weights = Array2::from_shape_vec(
            (3, 3),
            vec![
                0.4, 0.4, 0.2, //
                0.2, 0.3, 0.5, //
                1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0,
            ],
        )
        .unwrap();
        assert_eq!(harden_weights(&weights), vec![0, 2, 0]);
    }

    #[test]
    fn test_kmedoids_separates_outlier() {
        let features = three_county_features();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);
        let fit = KMedoids::new(2).fit(&distances).unwrap();

        assert_eq!(fit.labels.len(), 3);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_ne!(fit.labels[0], fit.labels[2]);
    }

    #[test]
    fn test_kmedoids_assignment_is_idempotent() {
        let features = three_county_features();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);
        let fit = KMedoids::new(2).fit(&distances).unwrap();

        let reassigned = assign_to_medoids(&distances, &fit.medoids);
        assert_eq!(reassigned, fit.labels);
    }

    #[test]
    fn test_kmedoids_medoids_are_locally_optimal() {
        let features = Array2::from_shape_vec(
            (3, 6),
            vec![
                0.0, 0.2, 0.1, 5.0, 5.1, 4.9, //
                0.0, 0.1, -0.1, 5.0, 4.8, 5.2, //
                0.0, -0.2, 0.2, 5.0, 5.2, 4.8,
            ],
        )
        .unwrap();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);
        let fit = KMedoids::new(2).fit(&distances).unwrap();

        for (j, &medoid) in fit.medoids.iter().enumerate() {
            let members: Vec<usize> = fit
                .labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == j)
                .map(|(i, _)| i)
                .collect();
            let medoid_cost: f64 = members.iter().map(|&m| distances[[medoid, m]]).sum();
            for &member in &members {
                let cost: f64 = members.iter().map(|&m| distances[[member, m]]).sum();
                assert!(medoid_cost <= cost + 1e-12);
            }
        }
    }

    #[test]
    fn test_kmedoids_deterministic() {
        let features = three_county_features();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);
        let a = KMedoids::new(2).fit(&distances).unwrap();
        let b = KMedoids::new(2).fit(&distances).unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.medoids, b.medoids);
    }

    #[test]
    fn test_kmedoids_invalid_parameters() {
        let features = three_county_features();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);

        assert!(matches!(
            KMedoids::new(1).fit(&distances),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            KMedoids::new(4).fit(&distances),
            Err(PipelineError::InvalidParameter(_))
        ));

        let not_square = Array2::zeros((3, 4));
        assert!(matches!(
            KMedoids::new(2).fit(&not_square),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_kmedoids_convergence_failure_carries_best_effort() {
        let features = three_county_features();
        let distances = pairwise_distances(&features, &MetricKind::Euclidean);
        let err = KMedoids::new(2).with_max_iters(0).fit(&distances).unwrap_err();

        match err {
            PipelineError::ConvergenceFailure {
                algorithm,
                iterations,
                best_effort,
            } => {
                assert_eq!(algorithm, "k-medoids");
                assert_eq!(iterations, 0);
                assert_eq!(best_effort.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
