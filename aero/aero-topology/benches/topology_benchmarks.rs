//! Benchmarks for edge topology construction.
//!
//! Run with: cargo bench -p aero-topology

use aero_topology::{build_topology, build_topology_sorted};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Structured grid of `n x n` quads split into triangles.
fn grid(n: u32) -> Vec<[u32; 3]> {
    let row = n + 1;
    let mut tris = Vec::with_capacity((n * n * 2) as usize);
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            tris.push([a, b, d]);
            tris.push([a, d, c]);
        }
    }
    tris
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");
    for n in [32, 128, 512] {
        let tris = grid(n);
        group.throughput(Throughput::Elements(tris.len() as u64));
        group.bench_with_input(BenchmarkId::new("hash", tris.len()), &tris, |b, tris| {
            b.iter(|| build_topology(black_box(tris)));
        });
        group.bench_with_input(BenchmarkId::new("sorted", tris.len()), &tris, |b, tris| {
            b.iter(|| build_topology_sorted(black_box(tris)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
