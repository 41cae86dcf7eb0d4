use crate::{steps, FeatureMatrix, KMeansState, Primitive, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

pub(crate) fn calculate<T: Primitive>(points: &FeatureMatrix<T>, state: &mut KMeansState<T>, rnd: &mut dyn RngCore) -> Result<()> {
    points.check_k(state.k)?;
    let sample_dims = points.sample_dims;
    { // Randomly select first centroid
        let first_idx = rnd.gen_range(0..points.sample_cnt);
        state.set_centroid_from_iter(0, points.row(first_idx).iter().cloned());
    }
    for k in 1..state.k { // For each following centroid...
        // Calculate each sample's distance to its nearest, already chosen centroid
        let chosen = &state.centroids[..k * sample_dims];
        points.rows()
            .zip(state.centroid_distances.iter_mut())
            .for_each(|(s, centroid_dist)| {
                *centroid_dist = steps::nearest_centroid(s, chosen, sample_dims).1;
            });

        // Use rand's WeightedIndex to randomly draw a centroid, while respecting their distances as weights.
        // All distances being zero means every sample coincides with a chosen centroid -> uniform draw.
        let sampled_centroid_id = match WeightedIndex::<T>::new(state.centroid_distances.iter()) {
            Ok(centroid_index) => centroid_index.sample(&mut *rnd),
            Err(_) => rnd.gen_range(0..points.sample_cnt),
        };
        state.set_centroid_from_iter(k, points.row(sampled_centroid_id).iter().cloned());
    }
    Ok(())
}
