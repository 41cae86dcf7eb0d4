use kmeans_eval::*;
use rand::prelude::*;

fn main() {
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 2500);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
    let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).expect("random samples are finite");

	let conf = KMeansConfig::build()
		.max_iter(max_iter)
		.init_done(&|_| println!("Initialization completed."))
		.iteration_done(&|s, nr, new_distsum|
			println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
				nr, s.distsum, new_distsum, s.distsum - new_distsum))
		.build();

    // Calculate kmeans, using random samples as initial centroids
    let result = ClusterEngine::new(conf).run(&points, k).expect("k is valid");

    println!("Centroid trajectory:");
    for (nr, snapshot) in result.trajectory().iter().enumerate() {
        println!("  {:>4}: {:?}", nr, &snapshot[..sample_dims.min(4)]);
    }
    println!("Error: {}", result.wcss());
}
