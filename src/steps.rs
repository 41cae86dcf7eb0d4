//! The two halves of a Lloyd iteration, as pure functions over row-major buffers.
//!
//! Centroid sets are passed as `[<centroid0>,<centroid1>,...]` with each
//! centroid having the dimensionality of the [`FeatureMatrix`] they are used
//! with, the same layout [`crate::KMeansState::centroids`] uses.

use crate::{helpers, primitive::from_count, ClusterError, FeatureMatrix, Primitive, Result};

/// Output of [`assign`].
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment<T: Primitive> {
    /// Index of the nearest centroid for every sample
    pub labels: Vec<usize>,
    /// Squared distance of every sample to its nearest centroid
    pub distances: Vec<T>,
}
impl<T: Primitive> Assignment<T> {
    /// Sum of all squared distances (the WCSS of this assignment)
    pub fn distsum(&self) -> T {
        self.distances.iter().cloned().sum()
    }
}

/// Output of [`update`].
#[derive(Clone, Debug, PartialEq)]
pub struct Update<T: Primitive> {
    /// New centroid set, row-major
    pub centroids: Vec<T>,
    /// Amount of samples assigned to each centroid
    pub centroid_frequency: Vec<usize>,
    /// Indices of centroids that had no samples and kept their previous position
    pub empty_clusters: Vec<usize>,
}

/// Index and squared distance of the centroid nearest to `sample`.
/// On exact ties the lowest centroid index wins.
#[inline(always)]
pub(crate) fn nearest_centroid<T: Primitive>(sample: &[T], centroids: &[T], sample_dims: usize) -> (usize, T) {
    centroids.chunks_exact(sample_dims)
        .map(|c| helpers::squared_distance(sample, c))
        .enumerate()
        .fold((0, T::infinity()), |(best_idx, best_dist), (idx, dist)| {
            // strict comparison keeps the earlier index on ties
            if dist < best_dist { (idx, dist) } else { (best_idx, best_dist) }
        })
}

/// Number of centroids in a row-major buffer, if it holds at least one and a whole number of them.
fn centroid_count<T: Primitive>(points: &FeatureMatrix<T>, centroids: &[T]) -> Result<usize> {
    let sample_dims = points.sample_dims;
    if centroids.is_empty() || centroids.len() % sample_dims != 0 {
        let expected = (centroids.len() / sample_dims).max(1) * sample_dims;
        return Err(ClusterError::DimensionMismatch { expected, actual: centroids.len() });
    }
    Ok(centroids.len() / sample_dims)
}

/// Map every sample to its nearest centroid (euclidean distance).
///
/// ## Errors
/// [`ClusterError::DimensionMismatch`] unless **centroids** holds at least one and a whole number
/// of centroids of the matrix' dimensionality.
pub fn assign<T: Primitive>(points: &FeatureMatrix<T>, centroids: &[T]) -> Result<Assignment<T>> {
    centroid_count(points, centroids)?;
    let (labels, distances) = points.rows()
        .map(|s| nearest_centroid(s, centroids, points.sample_dims))
        .unzip();
    Ok(Assignment { labels, distances })
}

/// Recompute every centroid as the mean of the samples assigned to it.
///
/// A centroid without samples keeps its position from `previous` and is
/// reported in [`Update::empty_clusters`]; it is never divided by zero.
///
/// ## Errors
/// - [`ClusterError::DimensionMismatch`] if **previous** is no valid centroid buffer (see [`assign`]),
///   or if there is not exactly one label per sample
/// - [`ClusterError::LabelOutOfRange`] for the first label that addresses no centroid of **previous**
pub fn update<T: Primitive>(points: &FeatureMatrix<T>, labels: &[usize], previous: &[T]) -> Result<Update<T>> {
    let sample_dims = points.sample_dims;
    let k = centroid_count(points, previous)?;
    if labels.len() != points.sample_cnt {
        return Err(ClusterError::DimensionMismatch { expected: points.sample_cnt, actual: labels.len() });
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= k) {
        return Err(ClusterError::LabelOutOfRange { label, k });
    }

    // Sum all samples in a cluster together into new_centroids
    let mut new_centroids = vec![T::zero(); previous.len()];
    let mut centroid_frequency = vec![0usize; k];
    points.rows()
        .zip(labels.iter().cloned())
        .for_each(|(s, centroid_id)| {
            centroid_frequency[centroid_id] += 1;
            new_centroids[centroid_id * sample_dims..(centroid_id + 1) * sample_dims].iter_mut()
                .zip(s.iter())
                .for_each(|(cv, &sv)| *cv += sv);
        });

    let mut empty_clusters = Vec::new();
    new_centroids.chunks_exact_mut(sample_dims)
        .zip(previous.chunks_exact(sample_dims))
        .zip(centroid_frequency.iter().cloned())
        .enumerate()
        .for_each(|(idx, ((c, prev), cfreq))| {
            if cfreq == 0 {
                c.copy_from_slice(prev);
                empty_clusters.push(idx);
            } else {
                let cfreq = from_count::<T>(cfreq);
                c.iter_mut().for_each(|v| *v = *v / cfreq);
            }
        });

    Ok(Update { centroids: new_centroids, centroid_frequency, empty_clusters })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use rand::prelude::*;

    #[test]
    fn assigns_to_nearest_centroid() {
        let points = testing::four_corners();
        let res = assign(&points, &[0.0, 0.0, 10.0, 0.0]).unwrap();
        assert_eq!(res.labels, vec![0, 0, 1, 1]);
        assert_eq!(res.distances, vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(res.distsum(), 2.0);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let points = FeatureMatrix::from_rows(&[[5.0f64, 0.0]]).unwrap();
        // Both centroids are exactly 5 away
        assert_eq!(assign(&points, &[0.0, 0.0, 10.0, 0.0]).unwrap().labels, vec![0]);
        assert_eq!(assign(&points, &[10.0, 0.0, 0.0, 0.0]).unwrap().labels, vec![0]);
        // Duplicate centroids
        assert_eq!(assign(&points, &[3.0, 0.0, 1.0, 1.0, 1.0, 1.0, 3.0, 0.0]).unwrap().labels, vec![0]);
    }

    #[test]
    fn update_takes_means() {
        let points = testing::four_corners();
        let res = update(&points, &[0, 0, 1, 1], &[0.0, 0.0, 10.0, 0.0]).unwrap();
        assert_eq!(res.centroids, vec![0.0, 0.5, 10.0, 0.5]);
        assert_eq!(res.centroid_frequency, vec![2, 2]);
        assert!(res.empty_clusters.is_empty());
    }

    #[test]
    fn empty_cluster_keeps_previous_position() {
        let points = FeatureMatrix::from_rows(&[[1.0f64, 0.0], [2.0, 0.0], [3.0, 0.0]]).unwrap();
        let previous = [2.0, 0.0, 1337.0, 0.0];
        let assignment = assign(&points, &previous).unwrap();
        assert_eq!(assignment.labels, vec![0, 0, 0]);

        let res = update(&points, &assignment.labels, &previous).unwrap();
        assert_eq!(res.centroids, vec![2.0, 0.0, 1337.0, 0.0]);
        assert_eq!(res.centroid_frequency, vec![3, 0]);
        assert_eq!(res.empty_clusters, vec![1]);
        assert!(res.centroids.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_malformed_centroids_and_labels() {
        let points = FeatureMatrix::from_rows(&[[1.0f64, 0.0], [2.0, 0.0]]).unwrap();
        assert_eq!(assign(&points, &[]), Err(ClusterError::DimensionMismatch { expected: 2, actual: 0 }));
        assert_eq!(assign(&points, &[0.0, 0.0, 5.0]), Err(ClusterError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(update(&points, &[0, 0], &[]), Err(ClusterError::DimensionMismatch { expected: 2, actual: 0 }));
        assert_eq!(update(&points, &[0], &[0.0, 0.0]), Err(ClusterError::DimensionMismatch { expected: 2, actual: 1 }));
        assert_eq!(update(&points, &[0, 2], &[0.0, 0.0, 1.0, 1.0]), Err(ClusterError::LabelOutOfRange { label: 2, k: 2 }));
    }

    #[test]
    fn converged_centroids_are_a_fixed_point() {
        let points = testing::four_corners();
        let converged = [0.0, 0.5, 10.0, 0.5];
        let assignment = assign(&points, &converged).unwrap();
        let res = update(&points, &assignment.labels, &converged).unwrap();
        assert_eq!(res.centroids, converged.to_vec());
    }

    #[test]
    fn matches_naive_assignment() {
        let (sample_cnt, sample_dims, k) = (500, 7, 5);
        let mut rnd = StdRng::seed_from_u64(7);
        let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
        let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).unwrap();
        let centroids = points.as_slice()[..k * sample_dims].to_vec();

        let res = assign(&points, &centroids).unwrap();
        for (i, s) in points.rows().enumerate() {
            let dists: Vec<f64> = centroids.chunks_exact(sample_dims)
                .map(|c| s.iter().zip(c).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt())
                .collect();
            let best = dists.iter().cloned().fold(f64::INFINITY, f64::min);
            assert_approx_eq!(res.distances[i].sqrt(), best, 1e-10);
            assert_eq!(dists[res.labels[i]], best);
        }
    }
}
