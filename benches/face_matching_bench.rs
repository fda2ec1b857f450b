//! Benchmarks for periodic face-node matching.
//!
//! Run with: `cargo bench --bench face_matching_bench`
//!
//! Compares the spatial-hash matcher with the all-pairs reference.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dg_hex::connectivity::{
    match_face_nodes, match_face_nodes_brute_force, matching_tolerance, FaceNodes,
};
use dg_hex::mesh::{apply_curved_warp, build_hex_mesh, WarpConfig};
use dg_hex::operators::HexOperators;
use dg_hex::simulation::ProblemKind;

/// Face-node coordinates and periods of a warped vortex mesh.
fn face_nodes(k1d: usize, order: usize) -> ([Vec<f64>; 3], [f64; 3]) {
    let problem = ProblemKind::Vortex;
    let mut mesh = build_hex_mesh(problem.counts(k1d), problem.bounds(), order).unwrap();
    apply_curved_warp(&mut mesh, &WarpConfig::new(0.5, problem.modes())).unwrap();
    let ops = HexOperators::new(order).unwrap();
    (mesh.face_coordinates(&ops), mesh.periods())
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("face_matching");
    group.sample_size(10);

    let order = 3;
    for k1d in [2, 4] {
        let ([x, y, z], periods) = face_nodes(k1d, order);
        let nodes = FaceNodes {
            x: &x,
            y: &y,
            z: &z,
            periods,
        };
        let tol = matching_tolerance(&x, &y, &z, order);
        let label = format!("K1D={}_{}_nodes", k1d, x.len());

        group.bench_with_input(BenchmarkId::new("spatial_hash", &label), &k1d, |b, _| {
            b.iter(|| match_face_nodes(black_box(&nodes), black_box(tol)))
        });

        group.bench_with_input(BenchmarkId::new("brute_force", &label), &k1d, |b, _| {
            b.iter(|| match_face_nodes_brute_force(black_box(&nodes), black_box(tol)))
        });
    }

    // Hash only: the all-pairs scan is quadratic at this size
    let ([x, y, z], periods) = face_nodes(8, order);
    let nodes = FaceNodes {
        x: &x,
        y: &y,
        z: &z,
        periods,
    };
    let tol = matching_tolerance(&x, &y, &z, order);
    group.bench_function("spatial_hash/K1D=8", |b| {
        b.iter(|| match_face_nodes(black_box(&nodes), black_box(tol)))
    });

    group.finish();
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
