//! Benchmarks for the sequential engine, the parallel reference and the metrics sweep.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kmeans_eval::*;
use rand::prelude::*;
use std::hint::black_box;

fn random_points<T: Primitive>(sample_cnt: usize, sample_dims: usize) -> FeatureMatrix<T> {
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(T::zero()..T::one())).collect();
    FeatureMatrix::new(samples, sample_cnt, sample_dims).unwrap()
}

// (sample_cnt, sample_dims, max_iter, k)
const SIZES: [(usize, usize, usize, usize); 3] = [(200, 2000, 10, 32), (2000, 200, 10, 32), (10000, 8, 10, 32)];

fn bench_lloyd<T: Primitive>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(name);
    group.sample_size(10);

    for &(sample_cnt, sample_dims, max_iter, k) in SIZES.iter() {
        let points = random_points::<T>(sample_cnt, sample_dims);
        let id = format!("{}x{}", sample_cnt, sample_dims);

        let engine = ClusterEngine::new(KMeansConfig::build().max_iter(max_iter).seed(1337).build());
        group.bench_with_input(BenchmarkId::new("engine", &id), &points, |b, points| {
            b.iter(|| engine.run_with_init(black_box(points), k, ClusterEngine::init_kmeanplusplus).unwrap());
        });

        let reference = ParallelLloyd::new(max_iter, T::zero());
        group.bench_with_input(BenchmarkId::new("parallel-lloyd", &id), &points, |b, points| {
            b.iter(|| reference.cluster(black_box(points), k, 1337).unwrap());
        });
    }

    group.finish();
}

fn bench_lloyd_f64(c: &mut Criterion) { bench_lloyd::<f64>(c, "lloyd_f64"); }
fn bench_lloyd_f32(c: &mut Criterion) { bench_lloyd::<f32>(c, "lloyd_f32"); }

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    group.sample_size(10);

    let points = random_points::<f64>(1000, 4);
    let k_values: Vec<usize> = (1..=8).collect();
    let evaluator = MetricsEvaluator::new(KMeansConfig::build().max_iter(20).build());
    group.bench_function("sequential", |b| b.iter(|| evaluator.sweep(black_box(&points), &k_values).unwrap()));
    group.bench_function("parallel", |b| b.iter(|| evaluator.par_sweep(black_box(&points), &k_values).unwrap()));

    group.finish();
}

criterion_group!(benches, bench_lloyd_f64, bench_lloyd_f32, bench_sweep);
criterion_main!(benches);
