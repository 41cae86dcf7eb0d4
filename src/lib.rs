//! # kmeans-eval - API documentation
//!
//! Kmeans-eval is a small rust library for running k-means clustering and judging its outcome.
//!
//! ## Design target
//! The engine is deliberately plain and single-threaded: one run is a sequence of observable
//! assignment and update steps, a deterministic function of its input and seed. Samples are given as a
//! row-major vector wrapped into a [`FeatureMatrix`], instead of any high-level matrix crate such as
//! nalgebra or ndarray.
//!
//! Around the engine, the crate offers
//! - [`MetricsEvaluator`]: sweeps over candidate cluster counts, reporting WCSS and silhouette score
//! - [`ComparisonHarness`]: runs the engine next to a [`ReferenceClusterer`] (the linfa-clustering
//!   backed [`LinfaKMeans`] or the rayon-parallel [`ParallelLloyd`]) and reports run time, WCSS and
//!   label agreement of both
//!
//! ## Supported centroid initializations
//! The outcome of each K-Means run depends on the initialization of its clusters. For a list of
//! implemented initialization methods, see [`ClusterEngine`].
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_eval::*;
//! use rand::prelude::*;
//!
//! let (sample_cnt, sample_dims, k) = (2000, 8, 4);
//!
//! // Generate some random data
//! let mut rnd = StdRng::seed_from_u64(1337);
//! let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
//! let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).unwrap();
//!
//! // Calculate kmeans, using kmean++ as initialization-method
//! let engine = ClusterEngine::new(KMeansConfig::build().max_iter(100).seed(7).build());
//! let result = engine.run_with_init(&points, k, ClusterEngine::init_kmeanplusplus).unwrap();
//!
//! println!("Centroids: {:?}", result.centroids());
//! println!("Cluster-Assignments: {:?}", result.labels());
//! println!("WCSS: {} after {} iterations ({:?})", result.wcss(), result.iterations(), result.state());
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_eval::*;
//!
//! let points = FeatureMatrix::from_rows(&[[0.0f64, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
//! let conf = KMeansConfig::build()
//!     .init_done(&|_| println!("Initialization completed."))
//!     .iteration_done(&|s, nr, new_distsum|
//!         println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
//!             nr, s.distsum, new_distsum, s.distsum - new_distsum))
//!     .build();
//!
//! let result = ClusterEngine::new(conf).run(&points, 2).unwrap();
//! println!("Error: {}", result.wcss());
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`ClusterEngine`] struct. It owns a [`KMeansConfig`] and is generic over
//! the underlying primitive type. Calling [`ClusterEngine::run`] does not mutate the engine, so one engine
//! can serve many runs. Internally, a new instance of [`KMeansState`] stores the state of a calculation; the
//! caller receives an independent [`RunResult`] including the [`Trajectory`] of all centroid positions.
//!
//! Failures (an invalid k, malformed input, mismatching precomputed centroids) are reported as [`ClusterError`].
//! Hitting the iteration cap is no error, but a [`RunState`] of the result.
//!
//! The crate logs through the [`log`] facade; hook up any logger implementation to see what a run does.

#[macro_use] mod helpers;
mod primitive;
mod error;
mod matrix;
mod steps;
mod convergence;
mod api;
mod result;
mod inits;
mod variants;
mod metrics;
mod comparison;

pub use primitive::Primitive;
pub use error::{ClusterError, Result};
pub use matrix::FeatureMatrix;
pub use steps::{assign, update, Assignment, Update};
pub use convergence::{ConvergenceCriterion, ConvergenceMonitor, RunState};
pub use api::{ClusterEngine, InitDoneCallbackFn, IterationDoneCallbackFn, KMeansConfig, KMeansConfigBuilder, KMeansState};
pub use result::{RunResult, Trajectory};
pub use variants::{LinfaKMeans, ParallelLloyd};
pub use metrics::{silhouette_samples, silhouette_score, wcss, MetricsEvaluator, SweepEntry, SweepReport};
pub use comparison::{compare, label_agreement, same_partition, ComparisonHarness, ComparisonReport, ReferenceClusterer, ReferenceOutcome};
