use crate::{ConvergenceCriterion, FeatureMatrix, Primitive, Result, RunResult};
use rand::RngCore;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// This is a structure holding the configuration of a k-means run: the iteration cap, the convergence
/// criterion, the seed used to derive the run's random number generator, and a couple of callbacks
/// that can be set to observe a running calculation (e.g. for plotting the centroid trajectory).
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Upper bound of assignment/update rounds
    pub(crate) max_iter: usize,
    /// Criterion deciding when the centroids have settled
    pub(crate) convergence: ConvergenceCriterion<T>,
    /// Seed for the run's random number generator
    pub(crate) seed: u64,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            max_iter: 100,
            convergence: ConvergenceCriterion::default(),
            seed: 0,
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    pub fn max_iter(&self) -> usize { self.max_iter }
    pub fn convergence(&self) -> ConvergenceCriterion<T> { self.convergence }
    pub fn seed(&self) -> u64 { self.seed }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("max_iter", &self.max_iter)
            .field("convergence", &self.convergence)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Limit the amount of assignment/update rounds. Hitting the limit is reported, not raised.
    /// ## Default
    /// `100`
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter; self
    }
    /// Shorthand for [`ConvergenceCriterion::CentroidShift`] with the given tolerance.
    /// ## Default
    /// `1e-4`
    pub fn epsilon(mut self, epsilon: T) -> Self {
        self.config.convergence = ConvergenceCriterion::CentroidShift { epsilon }; self
    }
    /// Set the convergence criterion to use. For more information, see documentation of [`ConvergenceCriterion`].
    pub fn convergence(mut self, convergence: ConvergenceCriterion<T>) -> Self {
        self.config.convergence = convergence; self
    }
    /// Set the seed every run derives its random number generator from.
    /// Identical inputs and seeds produce identical results.
    /// ## Default
    /// `0`
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation.
/// It is what initializers write into and what the observer callbacks receive.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested
/// - **distsum**: The total sum of (squared) distances from all samples to their respective centroids
/// - **centroids**: Current cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest cluster
/// - **centroid_distances**: Vector containing each sample's (squared) distance to its centroid
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize; k],
            assignments: vec![0usize; sample_cnt],
            centroid_distances: vec![T::infinity(); sample_cnt],
            sample_dims
        }
    }

    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// The `idx`-th centroid. Panics if `idx >= k`.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }
}


/// Entrypoint of this crate's API-Surface.
///
/// A [`ClusterEngine`] owns a [`KMeansConfig`] and runs Lloyd's k-means on any [`FeatureMatrix`]
/// passed to it. Running does not mutate the engine, so one engine can serve many runs.
///
/// ## Supported initialization methods
/// - Random-Sample / Forgy [`ClusterEngine::init_forgy`] (default of [`ClusterEngine::run`])
/// - K-Mean++ [`ClusterEngine::init_kmeanplusplus`]
/// - Precomputed centroids [`ClusterEngine::init_precomputed`]
///
/// ## Example
/// ```rust
/// use kmeans_eval::*;
///
/// let points = FeatureMatrix::from_rows(&[[0.0f64, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
/// let engine = ClusterEngine::new(KMeansConfig::build().max_iter(50).epsilon(1e-6).seed(42).build());
/// let result = engine.run(&points, 2).unwrap();
///
/// assert!(result.converged());
/// assert_eq!(result.k(), 2);
/// assert_eq!(result.trajectory().len(), result.iterations() + 1);
/// ```
#[derive(Debug, Default)]
pub struct ClusterEngine<'a, T: Primitive> {
    config: KMeansConfig<'a, T>,
}
impl<'a, T: Primitive> ClusterEngine<'a, T> {
    pub fn new(config: KMeansConfig<'a, T>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig<'a, T> { &self.config }

    /// Run k-means on **points**, using Forgy initialization.
    ///
    /// ## Errors
    /// [`crate::ClusterError::InvalidK`] if `k < 1` or `k > n`. Not converging within
    /// `max_iter` is no error, see [`RunResult::converged`].
    pub fn run(&self, points: &FeatureMatrix<T>, k: usize) -> Result<RunResult<T>> {
        self.run_with_init(points, k, Self::init_forgy)
    }

    /// Run k-means on **points**, using the given initialization method.
    ///
    /// ## Arguments
    /// - **points**: Samples to cluster
    /// - **k**: Amount of clusters to search for
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    pub fn run_with_init<F>(&self, points: &FeatureMatrix<T>, k: usize, init: F) -> Result<RunResult<T>>
                where F: FnOnce(&FeatureMatrix<T>, &mut KMeansState<T>, &mut dyn RngCore) -> Result<()> {
        crate::variants::lloyd::calculate(points, k, init, &self.config)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method selects k distinct samples (without replacement) as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to [`ClusterEngine::run_with_init`].
    pub fn init_forgy(points: &FeatureMatrix<T>, state: &mut KMeansState<T>, rnd: &mut dyn RngCore) -> Result<()> {
        crate::inits::randomsample::calculate(points, state, rnd)
    }

    /// K-Mean++ initialization method
    ///
    /// ## Description
    /// This initialization method starts by selecting one sample as first centroid.
    /// Proceeding from there, the method iteratively selects one new centroid (per iteration) by calculating
    /// each sample's probability of "being a centroid". This probability is bigger, the farther away a sample
    /// is from its nearest already chosen centroid.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to [`ClusterEngine::run_with_init`].
    pub fn init_kmeanplusplus(points: &FeatureMatrix<T>, state: &mut KMeansState<T>, rnd: &mut dyn RngCore) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(points, state, rnd)
    }

    /// Precomputed centroids initialization method
    ///
    /// ## Description
    /// Uses the given centroids as they are. Fails with [`crate::ClusterError::DimensionMismatch`] if a
    /// centroid's dimensionality differs from the samples', and with
    /// [`crate::ClusterError::CentroidCountMismatch`] if not exactly k centroids are given.
    pub fn init_precomputed(centroids: Vec<Vec<T>>)
                -> impl FnOnce(&FeatureMatrix<T>, &mut KMeansState<T>, &mut dyn RngCore) -> Result<()> {
        move |points: &FeatureMatrix<T>, state: &mut KMeansState<T>, _: &mut dyn RngCore| {
            crate::inits::precomputed::calculate(points, state, centroids)
        }
    }
}
