use kmeans_eval::*;
use rand::prelude::*;

fn main() {
    env_logger::init();
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 100);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
    let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).expect("random samples are finite");

    // Calculate kmeans, using kmean++ as initialization-method
    let engine = ClusterEngine::new(KMeansConfig::build().max_iter(max_iter).seed(42).build());
    let result = engine.run_with_init(&points, k, ClusterEngine::init_kmeanplusplus).expect("k is valid");

    println!("Centroids: {:?}", result.centroids());
    println!("Cluster-Assignments: {:?}", result.labels());
    println!("Error: {} ({:?} after {} iterations)", result.wcss(), result.state(), result.iterations());
}
