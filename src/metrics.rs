//! Clustering quality metrics and the k-sweep built on top of them.

use crate::{helpers, primitive::from_count, ClusterEngine, ClusterError, FeatureMatrix, KMeansConfig, Primitive, Result};
use log::debug;
use rayon::prelude::*;

/// Within-cluster sum of squares: total squared distance of every sample to the centroid it is labeled with.
///
/// # Panics
/// If a label addresses a centroid that is not contained in **centroids**.
pub fn wcss<T: Primitive>(points: &FeatureMatrix<T>, labels: &[usize], centroids: &[T]) -> T {
    let sample_dims = points.sample_dims;
    points.rows()
        .zip(labels.iter().cloned())
        .map(|(s, ci)| helpers::squared_distance(s, &centroids[ci * sample_dims..(ci + 1) * sample_dims]))
        .sum()
}

/// Per-sample silhouette coefficients `s(i) = (b(i) - a(i)) / max(a(i), b(i))`, where
/// - `a(i)` is the mean distance of sample `i` to the other members of its cluster
/// - `b(i)` is the mean distance of sample `i` to the members of the nearest other cluster
///
/// Samples alone in their cluster get `0`, as do samples with `max(a, b) == 0`.
/// Returns `Ok(None)` when the labels describe fewer than two non-empty clusters.
///
/// Runs in `O(n² · d)`.
pub fn silhouette_samples<T: Primitive>(points: &FeatureMatrix<T>, labels: &[usize]) -> Result<Option<Vec<T>>> {
    if labels.len() != points.sample_cnt {
        return Err(ClusterError::DimensionMismatch { expected: points.sample_cnt, actual: labels.len() });
    }
    let k = labels.iter().cloned().max().map_or(0, |m| m + 1);
    let centroid_frequency = helpers::cluster_frequencies(labels, k);
    if centroid_frequency.iter().filter(|&&f| f > 0).count() < 2 {
        return Ok(None);
    }

    let mut cluster_distsums = vec![T::zero(); k];
    let coefficients = points.rows().zip(labels.iter().cloned())
        .map(|(s, own)| {
            if centroid_frequency[own] == 1 {
                return T::zero();
            }
            // Sum of distances from s to the members of every cluster
            cluster_distsums.iter_mut().for_each(|d| *d = T::zero());
            points.rows().zip(labels.iter().cloned())
                .for_each(|(o, ci)| cluster_distsums[ci] += helpers::distance(s, o));

            // s itself contributes a zero distance to its own sum
            let a = cluster_distsums[own] / from_count::<T>(centroid_frequency[own] - 1);
            let b = cluster_distsums.iter().zip(centroid_frequency.iter().cloned())
                .enumerate()
                .filter(|&(ci, (_, cfreq))| ci != own && cfreq > 0)
                .map(|(_, (&dsum, cfreq))| dsum / from_count::<T>(cfreq))
                .fold(T::infinity(), T::min);

            let max_ab = a.max(b);
            if max_ab == T::zero() { T::zero() } else { (b - a) / max_ab }
        })
        .collect();
    Ok(Some(coefficients))
}

/// Mean silhouette coefficient over all samples, see [`silhouette_samples`].
/// `Ok(None)` when the labels describe fewer than two non-empty clusters.
pub fn silhouette_score<T: Primitive>(points: &FeatureMatrix<T>, labels: &[usize]) -> Result<Option<T>> {
    Ok(silhouette_samples(points, labels)?.map(|coefficients| {
        let cnt = from_count::<T>(coefficients.len());
        coefficients.into_iter().sum::<T>() / cnt
    }))
}


/// Quality metrics of one k-means run within a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepEntry<T: Primitive> {
    pub k: usize,
    pub wcss: T,
    /// Absent for `k == 1`, and whenever the run ended with fewer than two non-empty clusters
    pub silhouette: Option<T>,
    pub iterations: usize,
    pub converged: bool,
}

/// Sweep results, in the order the k values were requested.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepReport<T: Primitive> {
    entries: Vec<SweepEntry<T>>,
}
impl<T: Primitive> SweepReport<T> {
    pub fn entries(&self) -> &[SweepEntry<T>] { &self.entries }
    pub fn iter(&self) -> std::slice::Iter<'_, SweepEntry<T>> { self.entries.iter() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// First entry for the given k, if it was part of the sweep.
    pub fn get(&self, k: usize) -> Option<&SweepEntry<T>> {
        self.entries.iter().find(|e| e.k == k)
    }

    /// Sanity check for elbow inspection: whenever k grows from one entry to the next, the WCSS
    /// must not grow (up to a relative rounding tolerance of `1e-9`).
    pub fn wcss_non_increasing(&self) -> bool {
        let tolerance = T::from(1e-9).unwrap_or_else(T::epsilon);
        self.entries.windows(2)
            .filter(|w| w[1].k > w[0].k)
            .all(|w| w[1].wcss <= w[0].wcss + w[0].wcss.abs() * tolerance)
    }

    pub fn into_entries(self) -> Vec<SweepEntry<T>> { self.entries }
}
impl<'r, T: Primitive> IntoIterator for &'r SweepReport<T> {
    type Item = &'r SweepEntry<T>;
    type IntoIter = std::slice::Iter<'r, SweepEntry<T>>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}


/// Runs the [`ClusterEngine`] once per candidate k and reports WCSS and silhouette score for each.
///
/// Choosing k from the report is left to the caller.
///
/// ## Example
/// ```rust
/// use kmeans_eval::*;
///
/// let points = FeatureMatrix::from_rows(&[[0.0f64, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
/// let report = MetricsEvaluator::new(KMeansConfig::build().seed(1).build())
///     .sweep(&points, &[1, 2, 4])
///     .unwrap();
///
/// assert_eq!(report.get(1).unwrap().silhouette, None);
/// assert!(report.wcss_non_increasing());
/// ```
#[derive(Debug, Default)]
pub struct MetricsEvaluator<'a, T: Primitive> {
    engine: ClusterEngine<'a, T>,
}
impl<'a, T: Primitive> MetricsEvaluator<'a, T> {
    pub fn new(config: KMeansConfig<'a, T>) -> Self {
        Self { engine: ClusterEngine::new(config) }
    }

    /// Evaluate every k of **k_values** in order, one run each.
    ///
    /// ## Errors
    /// [`ClusterError::InvalidK`] for the first k outside `1..=n`.
    pub fn sweep(&self, points: &FeatureMatrix<T>, k_values: &[usize]) -> Result<SweepReport<T>> {
        let entries = k_values.iter()
            .map(|&k| evaluate(&self.engine, points, k))
            .collect::<Result<Vec<_>>>()?;
        Ok(SweepReport { entries })
    }

    /// Same as [`MetricsEvaluator::sweep`], with the runs distributed over rayon's thread pool.
    ///
    /// Every run gets its own engine and state, seeded exactly like the sequential sweep, so both
    /// return identical reports. Observer callbacks of the configuration are not invoked.
    pub fn par_sweep(&self, points: &FeatureMatrix<T>, k_values: &[usize]) -> Result<SweepReport<T>> {
        let config = self.engine.config();
        let (max_iter, convergence, seed) = (config.max_iter(), config.convergence(), config.seed());
        let entries = k_values.par_iter()
            .map(|&k| {
                let engine = ClusterEngine::new(KMeansConfig::build()
                    .max_iter(max_iter)
                    .convergence(convergence)
                    .seed(seed)
                    .build());
                evaluate(&engine, points, k)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SweepReport { entries })
    }
}

fn evaluate<T: Primitive>(engine: &ClusterEngine<'_, T>, points: &FeatureMatrix<T>, k: usize) -> Result<SweepEntry<T>> {
    let run = engine.run(points, k)?;
    let silhouette = if k >= 2 { silhouette_score(points, run.labels())? } else { None };
    debug!("sweep k={}: wcss={:e} silhouette={:?} iterations={} converged={}",
        k, run.wcss(), silhouette, run.iterations(), run.converged());
    Ok(SweepEntry { k, wcss: run.wcss(), silhouette, iterations: run.iterations(), converged: run.converged() })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn wcss_of_fixed_labels() {
        let points = testing::four_corners();
        assert_approx_eq!(wcss(&points, &[0, 0, 1, 1], &[0.0, 0.5, 10.0, 0.5]), 1.0);
        assert_approx_eq!(wcss(&points, &[0, 0, 0, 0], &[5.0, 0.5]), 101.0);
    }

    #[test]
    fn silhouette_by_hand() {
        // 1-D: {0, 2} and {10}
        let points = FeatureMatrix::from_rows(&[[0.0f64], [2.0], [10.0]]).unwrap();
        let samples = silhouette_samples(&points, &[0, 0, 1]).unwrap().unwrap();
        // s0: a = 2, b = 10 -> 0.8; s1: a = 2, b = 8 -> 0.75; s2: alone -> 0
        assert_approx_eq!(samples[0], 0.8);
        assert_approx_eq!(samples[1], 0.75);
        assert_approx_eq!(samples[2], 0.0);
        assert_approx_eq!(silhouette_score(&points, &[0, 0, 1]).unwrap().unwrap(), 1.55 / 3.0);
    }

    #[test]
    fn silhouette_of_separated_pairs() {
        let points = testing::four_corners();
        let score = silhouette_score(&points, &[0, 0, 1, 1]).unwrap().unwrap();
        // a = 1, b = (10 + sqrt(101)) / 2 for every sample
        let b = (10.0 + 101.0f64.sqrt()) / 2.0;
        assert_approx_eq!(score, (b - 1.0) / b);
        // A bad labelling scores worse
        assert!(silhouette_score(&points, &[0, 1, 0, 1]).unwrap().unwrap() < 0.0);
    }

    #[test]
    fn silhouette_absent_for_single_cluster() {
        let points = testing::four_corners();
        assert_eq!(silhouette_score(&points, &[0, 0, 0, 0]).unwrap(), None);
        // Label 0 unused, still only one non-empty cluster
        assert_eq!(silhouette_score(&points, &[1, 1, 1, 1]).unwrap(), None);
    }

    #[test]
    fn silhouette_rejects_wrong_label_count() {
        let points = testing::four_corners();
        assert_eq!(silhouette_score(&points, &[0, 1]), Err(ClusterError::DimensionMismatch { expected: 4, actual: 2 }));
    }

    #[test]
    fn sweep_is_ordered_by_input() {
        let points = testing::blobs(&[[0.0, 0.0], [40.0, 0.0], [0.0, 40.0]], 20, 1);
        let report = MetricsEvaluator::new(KMeansConfig::build().seed(3).build())
            .sweep(&points, &[3, 1, 2])
            .unwrap();
        let ks: Vec<usize> = report.iter().map(|e| e.k).collect();
        assert_eq!(ks, vec![3, 1, 2]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.get(1).unwrap().silhouette, None);
        assert!(report.get(2).unwrap().silhouette.is_some());
        assert!(report.get(1).unwrap().wcss >= report.get(2).unwrap().wcss);
    }

    #[test]
    fn sweep_propagates_invalid_k() {
        let points = testing::four_corners();
        let evaluator = MetricsEvaluator::new(KMeansConfig::build().build());
        assert_eq!(evaluator.sweep(&points, &[1, 2, 5]), Err(ClusterError::InvalidK { k: 5, n: 4 }));
        assert_eq!(evaluator.par_sweep(&points, &[0]), Err(ClusterError::InvalidK { k: 0, n: 4 }));
    }

    #[test]
    fn k1_is_the_column_mean_and_has_no_silhouette() {
        let points = testing::blobs(&[[1.0, 2.0], [4.0, -3.0]], 10, 8);
        let report = MetricsEvaluator::new(KMeansConfig::build().build()).sweep(&points, &[1]).unwrap();
        let entry = &report.entries()[0];
        assert_eq!(entry.silhouette, None);
        assert!(entry.converged);
        let means = points.column_means();
        assert_approx_eq!(entry.wcss, wcss(&points, &[0; 20], &means), 1e-9);
    }

    #[test]
    fn par_sweep_equals_sweep() {
        let _ = env_logger::builder().is_test(true).try_init();
        let points = testing::blobs(&[[0.0, 0.0], [6.0, 1.0], [2.0, 7.0], [9.0, 9.0]], 15, 21);
        let evaluator = MetricsEvaluator::new(KMeansConfig::build().seed(5).max_iter(50).build());
        let ks = [1, 2, 3, 4, 5, 6];
        assert_eq!(evaluator.sweep(&points, &ks).unwrap(), evaluator.par_sweep(&points, &ks).unwrap());
    }

    #[test]
    fn monotonic_check_detects_violations() {
        let entry = |k, wcss| SweepEntry { k, wcss, silhouette: None, iterations: 1, converged: true };
        let ok = SweepReport { entries: vec![entry(1, 10.0f64), entry(2, 4.0), entry(3, 4.0)] };
        assert!(ok.wcss_non_increasing());
        let bad = SweepReport { entries: vec![entry(1, 10.0f64), entry(2, 4.0), entry(3, 5.0)] };
        assert!(!bad.wcss_non_increasing());
        // Going back to a smaller k is not checked
        let unordered = SweepReport { entries: vec![entry(3, 1.0f64), entry(1, 10.0)] };
        assert!(unordered.wcss_non_increasing());
    }

    proptest! {
        #[test]
        fn wcss_non_increasing_over_1_2_n(sample_cnt in 3usize..30, seed in any::<u64>()) {
            let mut rnd = StdRng::seed_from_u64(seed);
            let samples: Vec<f64> = (0..sample_cnt * 2).map(|_| rnd.gen_range(-5.0..5.0)).collect();
            let points = FeatureMatrix::new(samples, sample_cnt, 2).unwrap();

            let report = MetricsEvaluator::new(KMeansConfig::build().seed(seed).build())
                .sweep(&points, &[1, 2, sample_cnt])
                .unwrap();
            prop_assert!(report.wcss_non_increasing(), "{:?}", report);
            prop_assert_eq!(report.get(sample_cnt).unwrap().wcss, 0.0);
        }

        #[test]
        fn silhouette_is_bounded(sample_cnt in 2usize..30, k in 2usize..5, seed in any::<u64>()) {
            let mut rnd = StdRng::seed_from_u64(seed);
            let samples: Vec<f64> = (0..sample_cnt).map(|_| rnd.gen_range(-5.0..5.0)).collect();
            let labels: Vec<usize> = (0..sample_cnt).map(|_| rnd.gen_range(0..k)).collect();
            let points = FeatureMatrix::new(samples, sample_cnt, 1).unwrap();

            if let Some(samples) = silhouette_samples(&points, &labels).unwrap() {
                prop_assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
            }
        }
    }
}
