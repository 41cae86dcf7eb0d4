use crate::{
    comparison::{ReferenceClusterer, ReferenceOutcome},
    helpers, inits, primitive::from_count, steps, ConvergenceCriterion, FeatureMatrix, KMeansState, Primitive, Result,
};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Throughput-oriented k-means, used as the reference the sequential engine is compared against.
///
/// Differences to [`crate::ClusterEngine`]:
/// - K-Mean++ initialization
/// - Assignment step parallelized over samples with rayon
/// - Empty clusters are re-seeded with the sample farthest from its centroid (taken from a
///   cluster with more than one sample), instead of keeping their position
/// - Aborts once an iteration improves the total distance sum by no more than **threshold**
#[derive(Clone, Copy, Debug)]
pub struct ParallelLloyd<T: Primitive> {
    max_iter: usize,
    threshold: T,
}
impl<T: Primitive> Default for ParallelLloyd<T> {
    fn default() -> Self {
        Self { max_iter: 300, threshold: T::from(0.0005).unwrap_or_else(T::epsilon) }
    }
}
impl<T: Primitive> ParallelLloyd<T> {
    pub fn new(max_iter: usize, threshold: T) -> Self {
        Self { max_iter, threshold }
    }

    fn update_cluster_assignments(points: &FeatureMatrix<T>, state: &mut KMeansState<T>) {
        let centroids = &state.centroids;
        let sample_dims = points.sample_dims;

        // manually calculate work-packet size, because rayon does not do static scheduling (which is more apropriate here)
        let work_packet_size = (points.sample_cnt / rayon::current_num_threads()).max(1);
        points.samples.par_chunks_exact(sample_dims)
            .with_min_len(work_packet_size)
            .zip(state.assignments.par_iter_mut())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let (best_idx, best_dist) = steps::nearest_centroid(s, centroids, sample_dims);
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
    }

    fn update_centroids(points: &FeatureMatrix<T>, state: &mut KMeansState<T>) -> T {
        let sample_dims = points.sample_dims;
        let (assignments, k) = (&state.assignments, state.k);

        // Count cluster sizes and sum all samples of a cluster into new_centroids at the same time
        let (centroid_frequency, mut new_centroids) = rayon::join(
            || helpers::cluster_frequencies(assignments, k),
            || {
                let mut sums = vec![T::zero(); k * sample_dims];
                points.rows()
                    .zip(assignments.iter().cloned())
                    .for_each(|(s, centroid_id)| {
                        sums[centroid_id * sample_dims..(centroid_id + 1) * sample_dims].iter_mut()
                            .zip(s.iter())
                            .for_each(|(cv, &sv)| *cv += sv);
                    });
                sums
            });
        state.centroid_frequency = centroid_frequency;
        let mut new_distsum: T = state.centroid_distances.iter().cloned().sum();

        // When there are empty clusters, assign bad samples to them
        if state.centroid_frequency.iter().any(|&f| f == 0) {
            let mut distance_sorted_samples: Vec<usize> = (0..points.sample_cnt).collect();
            distance_sorted_samples.sort_by(|&i1, &i2|
                state.centroid_distances[i1].partial_cmp(&state.centroid_distances[i2]).unwrap_or(Ordering::Equal));

            for i in 0..k {
                if state.centroid_frequency[i] != 0 {
                    continue;
                }
                // Find the sample with the highest distance to its centroid, that is not alone in its cluster
                let found = distance_sorted_samples.iter().rev().cloned()
                    .find(|&sample_id| state.centroid_frequency[state.assignments[sample_id]] > 1);
                let sample_id = match found {
                    Some(sample_id) => sample_id,
                    None => continue,
                };
                let prev_centroid_id = state.assignments[sample_id];
                let sample = points.row(sample_id);

                // Re-Assign found sample to centroid without any samples
                state.centroid_frequency[prev_centroid_id] -= 1;
                state.centroid_frequency[i] += 1;
                new_distsum -= state.centroid_distances[sample_id];
                // Centroid is moved into the chosen point -> the points centroid distance is 0
                state.centroid_distances[sample_id] = T::zero();
                // new_centroids is a sum of all points within a centroid here.
                // Subtract chosen sample from its previous centroid
                new_centroids[prev_centroid_id * sample_dims..(prev_centroid_id + 1) * sample_dims].iter_mut()
                    .zip(sample.iter())
                    .for_each(|(cv, &sv)| *cv -= sv);
                // Chosen sample is single point in cluster -> set cluster's sum to chosen point
                new_centroids[i * sample_dims..(i + 1) * sample_dims].copy_from_slice(sample);
                state.assignments[sample_id] = i;
            }
        }

        // Calculate new centroids from updated cluster_assignments
        state.centroids.chunks_exact_mut(sample_dims)
            .zip(new_centroids.chunks_exact(sample_dims))
            .zip(state.centroid_frequency.iter().cloned())
            .filter(|(_, cfreq)| *cfreq > 0)
            .for_each(|((c, nc), cfreq)| {
                let cfreq = from_count::<T>(cfreq);
                c.iter_mut().zip(nc.iter()).for_each(|(cv, &ncv)| *cv = ncv / cfreq);
            });
        new_distsum
    }
}

impl<T: Primitive> ReferenceClusterer<T> for ParallelLloyd<T> {
    fn name(&self) -> &str { "parallel-lloyd" }

    fn cluster(&self, points: &FeatureMatrix<T>, k: usize, seed: u64) -> Result<ReferenceOutcome<T>> {
        points.check_k(k)?;
        let mut rnd = StdRng::seed_from_u64(seed);
        let mut state = KMeansState::new(points.sample_cnt, points.sample_dims, k);
        state.distsum = T::infinity();
        inits::kmeanplusplus::calculate(points, &mut state, &mut rnd)?;

        let mut abort_logic = ConvergenceCriterion::NoImprovement { threshold: self.threshold }.create_logic();
        let mut iterations = 0;
        for i in 1..=self.max_iter {
            Self::update_cluster_assignments(points, &mut state);
            let new_distsum = Self::update_centroids(points, &mut state);
            iterations = i;
            if abort_logic.settled(T::zero(), new_distsum) {
                break;
            }
            state.distsum = new_distsum;
        }

        // Labels and distances with respect to the final centroids
        Self::update_cluster_assignments(points, &mut state);
        let wcss = state.centroid_distances.iter().cloned().sum();
        Ok(ReferenceOutcome { labels: state.assignments, centroids: state.centroids, wcss, iterations: Some(iterations) })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use rand::prelude::*;

    #[test]
    fn parallel_assignment_matches_sequential() {
        for &sample_dims in &[1usize, 2, 3, 17] {
            let (sample_cnt, k) = (1000, 5);
            let mut rnd = StdRng::seed_from_u64(sample_dims as u64);
            let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
            let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).unwrap();

            let mut state = KMeansState::new(sample_cnt, sample_dims, k);
            state.centroids.copy_from_slice(&points.as_slice()[..k * sample_dims]);
            ParallelLloyd::update_cluster_assignments(&points, &mut state);

            let should = steps::assign(&points, &state.centroids).unwrap();
            assert_eq!(state.assignments, should.labels);
            assert_eq!(state.centroid_distances, should.distances);
        }
    }

    #[test]
    fn empty_cluster_receives_farthest_sample() {
        let points = FeatureMatrix::from_rows(&[[1.0f64, 0.0], [2.0, 0.0], [3.0, 0.0]]).unwrap();
        let mut state = KMeansState::new(3, 2, 2);
        state.centroids.copy_from_slice(&[2.0, 0.0, 1337.0, 0.0]);

        ParallelLloyd::update_cluster_assignments(&points, &mut state);
        let distsum = ParallelLloyd::update_centroids(&points, &mut state);

        assert_eq!(distsum, 1.0);
        assert_eq!(state.assignments, vec![0, 0, 1]);
        assert_eq!(state.centroids, vec![1.5, 0.0, 3.0, 0.0]);
        assert_eq!(state.centroid_frequency, vec![2, 1]);
        assert_eq!(state.centroid_distances, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn finds_separated_blobs() {
        let points = testing::blobs(&[[0.0, 0.0], [30.0, 0.0], [0.0, 30.0]], 50, 3);
        let outcome = ParallelLloyd::default().cluster(&points, 3, 8).unwrap();

        for blob in 0..3 {
            let labels = &outcome.labels[blob * 50..(blob + 1) * 50];
            assert!(labels.iter().all(|&l| l == labels[0]));
        }
        assert!(outcome.iterations >= Some(1));
        assert_approx_eq!(outcome.wcss, crate::metrics::wcss(&points, &outcome.labels, &outcome.centroids), 1e-9);
    }

    #[test]
    fn rejects_invalid_k() {
        let points = testing::four_corners();
        assert!(ParallelLloyd::default().cluster(&points, 5, 0).is_err());
        assert!(ParallelLloyd::default().cluster(&points, 0, 0).is_err());
    }
}
