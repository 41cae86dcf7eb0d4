use crate::{FeatureMatrix, KMeansState, Primitive, Result};
use rand::RngCore;

pub(crate) fn calculate<T: Primitive>(points: &FeatureMatrix<T>, state: &mut KMeansState<T>, rnd: &mut dyn RngCore) -> Result<()> {
    points.check_k(state.k)?;
    // Draw k distinct sample indices and copy those samples into state.centroids
    rand::seq::index::sample(rnd, points.sample_cnt, state.k).iter()
        .enumerate()
        .for_each(|(ci, si)| {
            state.set_centroid_from_iter(ci, points.row(si).iter().cloned());
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{ClusterEngine, ClusterError, FeatureMatrix, KMeansState};
    use rand::prelude::*;

    fn line(sample_cnt: usize) -> FeatureMatrix<f64> {
        FeatureMatrix::new((0..sample_cnt).map(|i| i as f64).collect(), sample_cnt, 1).unwrap()
    }

    #[test]
    fn picks_distinct_rows() {
        let points = line(50);
        for seed in 0..20 {
            let mut state = KMeansState::new(points.sample_cnt(), points.sample_dims(), 10);
            ClusterEngine::init_forgy(&points, &mut state, &mut StdRng::seed_from_u64(seed)).unwrap();
            let mut picked = state.centroids.clone();
            picked.sort_by(|a, b| a.partial_cmp(b).unwrap());
            picked.dedup();
            assert_eq!(picked.len(), 10);
            assert!(picked.iter().all(|v| v.fract() == 0.0 && *v >= 0.0 && *v < 50.0));
        }
    }

    #[test]
    fn same_seed_same_centroids() {
        let points = line(100);
        let mut a = KMeansState::new(points.sample_cnt(), points.sample_dims(), 4);
        let mut b = a.clone();
        ClusterEngine::init_forgy(&points, &mut a, &mut StdRng::seed_from_u64(3)).unwrap();
        ClusterEngine::init_forgy(&points, &mut b, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn k_larger_than_n_fails() {
        let points = line(3);
        let mut state = KMeansState::new(points.sample_cnt(), points.sample_dims(), 5);
        let res = ClusterEngine::init_forgy(&points, &mut state, &mut StdRng::seed_from_u64(0));
        assert_eq!(res, Err(ClusterError::InvalidK { k: 5, n: 3 }));
    }
}
