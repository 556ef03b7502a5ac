//! Benchmarks for the CPU reference and the emulated kernel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fpga_adder_core::compute::{add_scalar_with, ParallelThresholdsBuilder};
use fpga_adder_core::prelude::*;

fn benchmark_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_add");

    let sequential = ParallelThresholdsBuilder::new()
        .vector_threshold(usize::MAX)
        .build();
    let parallel = ParallelThresholdsBuilder::new().vector_threshold(0).build();

    for size in [4096usize, 65_536, 1 << 20].iter() {
        let input: Vec<i32> = (0..*size as i32).collect();
        let mut output = vec![0i32; *size];

        group.bench_with_input(BenchmarkId::new("sequential", size), size, |bench, _| {
            bench.iter(|| {
                add_scalar_with(&sequential, black_box(&input), &mut output, 10).unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), size, |bench, _| {
            bench.iter(|| {
                add_scalar_with(&parallel, black_box(&input), &mut output, 10).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_emulated_run(c: &mut Criterion) {
    let host = AdderHost::new(AdderConfig::default()).unwrap();
    let mut backend = EmulatedBackend::new();

    c.bench_function("emulated_default_run", |bench| {
        bench.iter(|| black_box(host.run(&mut backend).unwrap()));
    });
}

criterion_group!(benches, benchmark_reference, benchmark_emulated_run);
criterion_main!(benches);
