use crate::{ClusterError, FeatureMatrix, KMeansState, Primitive, Result};

pub(crate) fn calculate<T: Primitive>(points: &FeatureMatrix<T>, state: &mut KMeansState<T>, computed: Vec<Vec<T>>) -> Result<()> {
    if let Some(c) = computed.iter().find(|c| c.len() != points.sample_dims) {
        return Err(ClusterError::DimensionMismatch { expected: points.sample_dims, actual: c.len() });
    }
    if computed.len() != state.k {
        return Err(ClusterError::CentroidCountMismatch { expected: state.k, actual: computed.len() });
    }
    computed.into_iter().enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.into_iter());
    });
    Ok(())
}
