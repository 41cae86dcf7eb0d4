use kmeans_eval::*;
use rand::prelude::*;

fn main() {
    env_logger::init();
    let (per_blob, centers) = (200, [[0.0, 0.0], [8.0, 1.0], [3.0, 9.0], [-6.0, 5.0]]);

    // Four noisy blobs
    let mut rnd = StdRng::seed_from_u64(7);
    let samples: Vec<f64> = centers.iter()
        .flat_map(|c| std::iter::repeat(c).take(per_blob))
        .flat_map(|c| [c[0] + rnd.gen_range(-1.5..1.5), c[1] + rnd.gen_range(-1.5..1.5)])
        .collect();
    let points = FeatureMatrix::new(samples, centers.len() * per_blob, 2).expect("random samples are finite");

    let evaluator = MetricsEvaluator::new(KMeansConfig::build().seed(3).build());
    let report = evaluator.par_sweep(&points, &(1..=8).collect::<Vec<_>>()).expect("all k are valid");

    println!("{:>3} {:>14} {:>11} {:>6}", "k", "wcss", "silhouette", "iters");
    for entry in &report {
        let silhouette = entry.silhouette.map_or("-".to_owned(), |s| format!("{:.4}", s));
        println!("{:>3} {:>14.3} {:>11} {:>6}", entry.k, entry.wcss, silhouette, entry.iterations);
    }
    println!("WCSS non-increasing: {}", report.wcss_non_increasing());
}
