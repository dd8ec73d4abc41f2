//! Benchmarks for load interpolation.
//!
//! Run with: cargo bench -p aero-interp

use aero_interp::{InterpMesh, InterpParams, LoadSample, interpolate};
use aero_types::Point3;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Gently cambered `n x n` plate.
fn plate(n: u32, shift: f64) -> InterpMesh {
    let row = n + 1;
    let h = 1.0 / f64::from(n);
    let mut nodes = Vec::with_capacity((row * row) as usize);
    for j in 0..row {
        for i in 0..row {
            let x = f64::from(i) * h + shift;
            let y = f64::from(j) * h;
            nodes.push(Point3::new(x, y, 0.05 * (std::f64::consts::PI * x).sin()));
        }
    }
    let mut tris = Vec::with_capacity((n * n * 2) as usize);
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            tris.push([a, a + 1, a + row + 1]);
            tris.push([a, a + row + 1, a + row]);
        }
    }
    InterpMesh::new(nodes, tris)
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    for n in [16, 64, 128] {
        let source = plate(n, 0.0);
        let loads = (0..source.tri_count())
            .map(|i| LoadSample::cp(f64::from(u32::try_from(i % 17).unwrap_or(0)) * 0.1))
            .collect();
        let source = source.with_loads(loads);
        let dest = plate(n + n / 3, 0.001);

        group.throughput(Throughput::Elements(dest.tri_count() as u64));
        group.bench_with_input(
            BenchmarkId::new("plate", dest.tri_count()),
            &(source, dest),
            |b, (source, dest)| {
                b.iter(|| interpolate(black_box(source), black_box(dest), &InterpParams::default()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_interpolate);
criterion_main!(benches);
