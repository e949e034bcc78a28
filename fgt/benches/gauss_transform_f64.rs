use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use fgt::direct::direct_density;
use fgt::grid::helpers::{points_fixture, points_fixture_clustered};
use fgt::{Evaluate, GaussTransformBuilder};

fn gauss_transform_2d(c: &mut Criterion) {
    // Setup random references and queries
    let n_references = 100000;
    let n_queries = 100000;
    let references = points_fixture::<f64>(n_references, 2, None, None, Some(0));
    let queries = points_fixture::<f64>(n_queries, 2, None, None, Some(1));

    // FGT parameters
    let bandwidth = 0.05;
    let tolerance = 1e-6;

    let mut fgt = GaussTransformBuilder::new()
        .points(&queries, &references)
        .unwrap()
        .parameters(bandwidth, tolerance)
        .unwrap()
        .build()
        .unwrap();

    let mut fgt_direct = GaussTransformBuilder::new()
        .points(&queries, &references)
        .unwrap()
        .parameters(bandwidth, tolerance)
        .unwrap()
        .thresholds(usize::MAX, usize::MAX)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("Gauss Transform 2D 6 Digits");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(15));

    group.bench_function(format!("FGT, N={n_references}"), |b| {
        b.iter(|| fgt.evaluate().unwrap())
    });

    group.bench_function(format!("Grid direct, N={n_references}"), |b| {
        b.iter(|| fgt_direct.evaluate().unwrap())
    });
}

fn gauss_transform_3d_clustered(c: &mut Criterion) {
    let n_references = 50000;
    let n_queries = 10000;
    let references = points_fixture_clustered::<f64>(n_references, 3, 8, 0.05, Some(0));
    let queries = points_fixture_clustered::<f64>(n_queries, 3, 8, 0.05, Some(1));

    let bandwidth = 0.1;
    let tolerance = 1e-4;

    let mut fgt = GaussTransformBuilder::new()
        .points(&queries, &references)
        .unwrap()
        .parameters(bandwidth, tolerance)
        .unwrap()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("Gauss Transform 3D Clustered 4 Digits");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(15));

    group.bench_function(format!("FGT, N={n_references}"), |b| {
        b.iter(|| fgt.evaluate().unwrap())
    });

    group.bench_function(format!("Brute force, N={n_references}"), |b| {
        b.iter(|| direct_density(fgt.kernel(), queries.view(), references.view()))
    });
}

criterion_group!(gauss_transform, gauss_transform_2d, gauss_transform_3d_clustered);
criterion_main!(gauss_transform);
