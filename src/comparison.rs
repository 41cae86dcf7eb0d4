//! Side-by-side runs of the [`ClusterEngine`] and a reference implementation.

use crate::{ClusterEngine, ClusterError, FeatureMatrix, KMeansConfig, Primitive, Result};
use log::{debug, info};
use pathfinding::{kuhn_munkres::kuhn_munkres, matrix::Matrix};
use std::{collections::{BTreeSet, HashMap}, time::{Duration, Instant}};

/// Labels and centroids produced by a reference clusterer.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceOutcome<T: Primitive> {
    /// Cluster index of every sample
    pub labels: Vec<usize>,
    /// Row-major cluster centers
    pub centroids: Vec<T>,
    /// Within-cluster sum of squares of **labels** with respect to **centroids**
    pub wcss: T,
    /// Amount of iterations, if the implementation reports it
    pub iterations: Option<usize>,
}

/// Seam for the implementation the engine is measured against.
///
/// This crate ships [`crate::LinfaKMeans`] (linfa-clustering) and [`crate::ParallelLloyd`].
pub trait ReferenceClusterer<T: Primitive> {
    /// Short identifier used in reports and logs
    fn name(&self) -> &str;

    /// Cluster **points** into **k** clusters. Implementations that use randomness should derive
    /// it from **seed** only.
    fn cluster(&self, points: &FeatureMatrix<T>, k: usize, seed: u64) -> Result<ReferenceOutcome<T>>;
}

/// Timing and quality of one engine run next to one reference run on the same input.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonReport<T: Primitive> {
    pub k: usize,
    /// [`ReferenceClusterer::name`] of the reference
    pub reference: String,
    pub engine_duration: Duration,
    pub reference_duration: Duration,
    pub engine_wcss: T,
    pub reference_wcss: T,
    pub engine_iterations: usize,
    pub reference_iterations: Option<usize>,
    /// Fraction of samples on which both labelings agree after matching clusters, see [`label_agreement`]
    pub agreement: f64,
    /// Whether both labelings describe the same partition, up to renaming of the clusters
    pub identical_partition: bool,
}
impl<T: Primitive> ComparisonReport<T> {
    /// How many times faster the reference ran than the engine (`> 1.0` means the reference was faster).
    pub fn speedup(&self) -> f64 {
        let reference = self.reference_duration.as_secs_f64();
        if reference == 0.0 {
            return f64::INFINITY;
        }
        self.engine_duration.as_secs_f64() / reference
    }

    /// Engine WCSS minus reference WCSS, relative to the reference WCSS.
    /// `0.0` when both are zero.
    pub fn wcss_gap(&self) -> T {
        let diff = self.engine_wcss - self.reference_wcss;
        if self.reference_wcss == T::zero() {
            if diff == T::zero() { T::zero() } else { T::infinity() }
        } else {
            diff / self.reference_wcss
        }
    }
}


/// Runs a [`ClusterEngine`] and a [`ReferenceClusterer`] on the same input and reports how they differ.
///
/// The reference receives the engine configuration's seed.
///
/// ## Example
/// ```rust
/// use kmeans_eval::*;
///
/// let points = FeatureMatrix::from_rows(&[[0.0f64, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
/// let harness = ComparisonHarness::new(KMeansConfig::build().seed(3).build(), ParallelLloyd::default());
/// let report = harness.compare(&points, 2).unwrap();
///
/// assert_eq!(report.reference, "parallel-lloyd");
/// assert!(report.agreement >= 0.5);
/// if report.identical_partition {
///     assert_eq!(report.agreement, 1.0);
/// }
/// ```
#[derive(Debug)]
pub struct ComparisonHarness<'a, T: Primitive, R: ReferenceClusterer<T>> {
    engine: ClusterEngine<'a, T>,
    reference: R,
}
impl<'a, T: Primitive, R: ReferenceClusterer<T>> ComparisonHarness<'a, T, R> {
    pub fn new(config: KMeansConfig<'a, T>, reference: R) -> Self {
        Self { engine: ClusterEngine::new(config), reference }
    }

    pub fn engine(&self) -> &ClusterEngine<'a, T> { &self.engine }
    pub fn reference(&self) -> &R { &self.reference }

    /// Run both implementations once with **k** clusters.
    ///
    /// ## Errors
    /// Whatever the engine or the reference raise, e.g. [`crate::ClusterError::InvalidK`].
    pub fn compare(&self, points: &FeatureMatrix<T>, k: usize) -> Result<ComparisonReport<T>> {
        compare(points, k, self.engine.config(), &self.reference)
    }

    /// [`ComparisonHarness::compare`] for every k of **k_values**, in order.
    pub fn compare_all(&self, points: &FeatureMatrix<T>, k_values: &[usize]) -> Result<Vec<ComparisonReport<T>>> {
        k_values.iter().map(|&k| self.compare(points, k)).collect()
    }
}

/// Run the engine (Forgy initialization, configured by **config**) and **reference** on **points**
/// and compare their outcome. The reference is handed the configured seed.
pub fn compare<T, R>(points: &FeatureMatrix<T>, k: usize, config: &KMeansConfig<'_, T>, reference: &R)
            -> Result<ComparisonReport<T>>
            where T: Primitive, R: ReferenceClusterer<T> + ?Sized {
    let started = Instant::now();
    let run = crate::variants::lloyd::calculate(points, k, ClusterEngine::<T>::init_forgy, config)?;
    let engine_duration = started.elapsed();

    let started = Instant::now();
    let outcome = reference.cluster(points, k, config.seed())?;
    let reference_duration = started.elapsed();
    debug!("compare k={}: engine {:?} ({} iterations), {} {:?} ({:?} iterations)",
        k, engine_duration, run.iterations(), reference.name(), reference_duration, outcome.iterations);

    let report = ComparisonReport {
        k,
        reference: reference.name().to_owned(),
        engine_duration,
        reference_duration,
        engine_wcss: run.wcss(),
        reference_wcss: outcome.wcss,
        engine_iterations: run.iterations(),
        reference_iterations: outcome.iterations,
        agreement: label_agreement(run.labels(), &outcome.labels)?,
        identical_partition: same_partition(run.labels(), &outcome.labels),
    };
    info!("k={} speedup={:.2} wcss engine={:e} {}={:e} agreement={:.4}",
        k, report.speedup(), report.engine_wcss, report.reference, report.reference_wcss, report.agreement);
    Ok(report)
}

/// Fraction of samples that land in matching clusters, under the one-to-one pairing of the clusters
/// of both labelings that maximizes this fraction. Invariant to renaming the clusters of either side.
///
/// The pairing is an optimal assignment (Kuhn-Munkres) on the contingency table. Clusters left
/// without partner, when both sides differ in their amount of clusters, count as disagreement.
/// Two empty labelings agree fully.
///
/// ## Errors
/// [`ClusterError::DimensionMismatch`] if both labelings have different lengths.
pub fn label_agreement(a: &[usize], b: &[usize]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(ClusterError::DimensionMismatch { expected: a.len(), actual: b.len() });
    }
    if a.is_empty() {
        return Ok(1.0);
    }

    // Dense cluster indices for both sides
    let dense = |labels: &[usize]| -> HashMap<usize, usize> {
        labels.iter().cloned().collect::<BTreeSet<_>>()
            .into_iter().enumerate().map(|(idx, label)| (label, idx)).collect()
    };
    let (a_ids, b_ids) = (dense(a), dense(b));

    // kuhn_munkres wants no more rows than columns
    let transposed = a_ids.len() > b_ids.len();
    let (rows, columns) = if transposed { (b_ids.len(), a_ids.len()) } else { (a_ids.len(), b_ids.len()) };
    let mut contingency = Matrix::new(rows, columns, 0i64);
    a.iter().zip(b.iter()).for_each(|(la, lb)| {
        let (ia, ib) = (a_ids[la], b_ids[lb]);
        let cell = if transposed { (ib, ia) } else { (ia, ib) };
        contingency[cell] += 1;
    });

    let (matched, _) = kuhn_munkres(&contingency);
    Ok(matched as f64 / a.len() as f64)
}

/// Whether both labelings describe the same partition, i.e. there is a one-to-one renaming of
/// clusters that turns **a** into **b**.
pub fn same_partition(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_to_b: HashMap<usize, usize> = HashMap::new();
    let mut b_to_a: HashMap<usize, usize> = HashMap::new();
    a.iter().cloned().zip(b.iter().cloned()).all(|(la, lb)| {
        *a_to_b.entry(la).or_insert(lb) == lb && *b_to_a.entry(lb).or_insert(la) == la
    })
}
