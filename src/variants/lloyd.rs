use crate::{helpers, steps, ConvergenceMonitor, FeatureMatrix, KMeansConfig, KMeansState, Primitive, Result, RunResult, RunState, Trajectory};
use log::{debug, trace, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Plain, single-threaded Lloyd iteration:
/// `init → (assign → update → check)*` until the monitor reaches a terminal [`RunState`].
pub(crate) fn calculate<T, F>(points: &FeatureMatrix<T>, k: usize, init: F, config: &KMeansConfig<'_, T>) -> Result<RunResult<T>>
            where T: Primitive, F: FnOnce(&FeatureMatrix<T>, &mut KMeansState<T>, &mut dyn RngCore) -> Result<()> {
    points.check_k(k)?;

    let mut rnd = StdRng::seed_from_u64(config.seed);
    let mut state = KMeansState::new(points.sample_cnt, points.sample_dims, k);

    // Initialize clusters, reject whatever the initializer left unusable, and notify subscriber
    init(points, &mut state, &mut rnd)?;
    points.check_centroids(&state.centroids, k)?;
    (config.init_done)(&state);
    debug!("k-means run: n={} d={} k={} max_iter={} seed={}",
        points.sample_cnt, points.sample_dims, k, config.max_iter, config.seed);

    let mut monitor = ConvergenceMonitor::new(config.convergence, config.max_iter);
    let mut trajectory = Trajectory::with_capacity(k, points.sample_dims, config.max_iter.min(1024) + 1);
    trajectory.push(&state.centroids);
    state.distsum = T::infinity();

    while monitor.should_continue() {
        let assignment = steps::assign(points, &state.centroids)?;
        let update = steps::update(points, &assignment.labels, &state.centroids)?;
        if !update.empty_clusters.is_empty() {
            warn!("iteration {}: clusters {:?} have no samples, keeping their previous centroids",
                monitor.iterations() + 1, update.empty_clusters);
        }

        let shift = helpers::max_shift(&state.centroids, &update.centroids);
        let new_distsum = assignment.distsum();
        state.centroids = update.centroids;
        state.centroid_frequency = update.centroid_frequency;
        state.assignments = assignment.labels;
        state.centroid_distances = assignment.distances;
        trajectory.push(&state.centroids);

        // Notify subscriber about finished iteration
        (config.iteration_done)(&state, monitor.iterations() + 1, new_distsum);
        let run_state = monitor.observe(shift, new_distsum);
        trace!("iteration {}: shift={:e} distsum={:e} -> {:?}", monitor.iterations(), shift, new_distsum, run_state);
        state.distsum = new_distsum;
    }

    if monitor.iterations() == 0 {
        // Never iterated (max_iter == 0): still report an assignment for the initial centroids
        let assignment = steps::assign(points, &state.centroids)?;
        state.centroid_frequency = helpers::cluster_frequencies(&assignment.labels, k);
        state.assignments = assignment.labels;
    }

    // Distances with respect to the final (frozen) centroids
    state.centroid_distances = points.rows()
        .zip(state.assignments.iter().cloned())
        .map(|(s, ci)| helpers::squared_distance(s, state.centroid(ci)))
        .collect();
    state.distsum = state.centroid_distances.iter().cloned().sum();

    match monitor.state() {
        RunState::MaxItersReached => warn!("k-means run (k={}) stopped at max_iter={} without converging", k, config.max_iter),
        run_state => debug!("k-means run (k={}) finished after {} iterations: {:?}", k, monitor.iterations(), run_state),
    }
    Ok(RunResult::new(state, trajectory, monitor.state(), monitor.iterations()))
}
