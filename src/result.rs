use crate::{KMeansState, Primitive, RunState};

/// Append-only history of centroid sets, one snapshot per iteration plus the initial one.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory<T: Primitive> {
    k: usize,
    sample_dims: usize,
    snapshots: Vec<Vec<T>>,
}
impl<T: Primitive> Trajectory<T> {
    /// Pre-allocates room for `capacity` snapshots (`max_iter + 1` for a run).
    pub(crate) fn with_capacity(k: usize, sample_dims: usize, capacity: usize) -> Self {
        Self { k, sample_dims, snapshots: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, centroids: &[T]) {
        debug_assert_eq!(centroids.len(), self.k * self.sample_dims);
        self.snapshots.push(centroids.to_vec());
    }

    pub fn len(&self) -> usize { self.snapshots.len() }
    pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

    /// Row-major centroid set after iteration `idx` (`0` is the initialization).
    pub fn snapshot(&self, idx: usize) -> Option<&[T]> {
        self.snapshots.get(idx).map(|s| s.as_slice())
    }

    /// Position of centroid `centroid` after iteration `idx`.
    pub fn centroid(&self, idx: usize, centroid: usize) -> Option<&[T]> {
        if centroid >= self.k {
            return None;
        }
        self.snapshot(idx).map(|s| &s[centroid * self.sample_dims..(centroid + 1) * self.sample_dims])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.snapshots.iter().map(|s| s.as_slice())
    }
}


/// Final outcome of one k-means run.
///
/// Owns independent copies of everything it reports, so it stays valid regardless of what
/// happens to the input afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult<T: Primitive> {
    k: usize,
    sample_dims: usize,
    centroids: Vec<T>,
    assignments: Vec<usize>,
    centroid_frequency: Vec<usize>,
    centroid_distances: Vec<T>,
    distsum: T,
    trajectory: Trajectory<T>,
    iterations: usize,
    state: RunState,
}
impl<T: Primitive> RunResult<T> {
    pub(crate) fn new(state: KMeansState<T>, trajectory: Trajectory<T>, run_state: RunState, iterations: usize) -> Self {
        debug_assert!(run_state.is_terminal());
        debug_assert_eq!(trajectory.len(), iterations + 1);
        Self {
            k: state.k,
            sample_dims: state.sample_dims,
            centroids: state.centroids,
            assignments: state.assignments,
            centroid_frequency: state.centroid_frequency,
            centroid_distances: state.centroid_distances,
            distsum: state.distsum,
            trajectory,
            iterations,
            state: run_state,
        }
    }

    /// The amount of clusters that were requested
    pub fn k(&self) -> usize { self.k }
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    /// Final cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
    pub fn centroids(&self) -> &[T] { &self.centroids }
    /// The `idx`-th final centroid. Panics if `idx >= k`.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }
    /// Cluster index of every sample, from the last assignment step
    pub fn labels(&self) -> &[usize] { &self.assignments }
    /// Amount of samples in each cluster
    pub fn centroid_frequency(&self) -> &[usize] { &self.centroid_frequency }
    /// Squared distance of every sample to its final centroid
    pub fn centroid_distances(&self) -> &[T] { &self.centroid_distances }
    /// Within-cluster sum of squares with respect to the final centroids
    pub fn wcss(&self) -> T { self.distsum }
    pub fn trajectory(&self) -> &Trajectory<T> { &self.trajectory }
    /// Amount of assignment/update rounds that ran
    pub fn iterations(&self) -> usize { self.iterations }
    pub fn state(&self) -> RunState { self.state }
    pub fn converged(&self) -> bool { self.state == RunState::Converged }
}
