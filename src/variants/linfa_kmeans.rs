use crate::{
    comparison::{ReferenceClusterer, ReferenceOutcome},
    ClusterError, FeatureMatrix, Primitive, Result,
};
use linfa::{prelude::*, DatasetBase};
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};

const NAME: &str = "linfa-kmeans";

/// The k-means of [linfa-clustering](https://docs.rs/linfa-clustering), as an independent reference
/// for the engine.
///
/// linfa seeds with K-Mean++ and keeps the best of **n_runs** runs. It does not report how many
/// iterations it took, so [`ReferenceOutcome::iterations`] stays `None`.
#[derive(Clone, Copy, Debug)]
pub struct LinfaKMeans<T: Primitive> {
    max_iter: u64,
    tolerance: T,
    n_runs: usize,
}
impl<T: Primitive + linfa::Float> Default for LinfaKMeans<T> {
    fn default() -> Self {
        let tolerance = <T as num::NumCast>::from(1e-4).unwrap_or_else(<T as num::Float>::epsilon);
        Self { max_iter: 300, tolerance, n_runs: 1 }
    }
}
impl<T: Primitive + linfa::Float> LinfaKMeans<T> {
    pub fn new(max_iter: u64, tolerance: T, n_runs: usize) -> Self {
        Self { max_iter, tolerance, n_runs }
    }
}

fn reference_error(message: impl ToString) -> ClusterError {
    ClusterError::Reference { name: NAME.to_owned(), message: message.to_string() }
}

impl<T: Primitive + linfa::Float> ReferenceClusterer<T> for LinfaKMeans<T> {
    fn name(&self) -> &str { NAME }

    fn cluster(&self, points: &FeatureMatrix<T>, k: usize, seed: u64) -> Result<ReferenceOutcome<T>> {
        points.check_k(k)?;
        let records = Array2::from_shape_vec((points.sample_cnt(), points.sample_dims()), points.as_slice().to_vec())
            .map_err(reference_error)?;
        let dataset = DatasetBase::from(records);

        let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(seed))
            .max_n_iterations(self.max_iter)
            .tolerance(self.tolerance)
            .n_runs(self.n_runs)
            .fit(&dataset)
            .map_err(reference_error)?;

        let labels = model.predict(dataset.records()).to_vec();
        let centroids: Vec<T> = model.centroids().iter().cloned().collect();
        let wcss = crate::metrics::wcss(points, &labels, &centroids);
        Ok(ReferenceOutcome { labels, centroids, wcss, iterations: None })
    }
}
