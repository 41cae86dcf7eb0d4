use kmeans_eval::*;
use rand::prelude::*;

fn print_reports<T: Primitive>(reports: &[ComparisonReport<T>]) {
    for report in reports {
        let reference_iterations = report.reference_iterations.map_or_else(|| "-".to_owned(), |it| it.to_string());
        println!("k={:>2} engine {:>9.2?} ({:>3} it, wcss {:.1}) | {} {:>9.2?} ({:>3} it, wcss {:.1}) | speedup {:.2} agreement {:.3}",
            report.k,
            report.engine_duration, report.engine_iterations, report.engine_wcss,
            report.reference, report.reference_duration, reference_iterations, report.reference_wcss,
            report.speedup(), report.agreement);
    }
}

fn main() {
    env_logger::init();
    let (sample_cnt, sample_dims) = (50000, 16);
    let k_values = [2, 4, 8, 16];

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples: Vec<f32> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();
    let points = FeatureMatrix::new(samples, sample_cnt, sample_dims).expect("random samples are finite");

    let harness = ComparisonHarness::new(KMeansConfig::build().seed(1).build(), LinfaKMeans::default());
    print_reports(&harness.compare_all(&points, &k_values).expect("all k are valid"));

    let harness = ComparisonHarness::new(KMeansConfig::build().seed(1).build(), ParallelLloyd::default());
    print_reports(&harness.compare_all(&points, &k_values).expect("all k are valid"));
}
