//! Performance benchmarks for HostCpu
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hostcpu::assign::{build_profile, build_summary, compress_range};
use hostcpu::inventory::{CoreRecord, CpuFunction, NumaNode, Personality};

/// Build a `nodes` x `cores` x 2-thread host with a typical compute layout
fn create_host(nodes: u32, cores: u32) -> (Vec<CoreRecord>, Vec<NumaNode>) {
    let mut cpus = Vec::new();
    for node in 0..nodes {
        for core in 0..cores {
            let function = match core {
                0 => CpuFunction::Platform,
                1 | 2 => CpuFunction::Vswitch,
                3 if node == 0 => CpuFunction::Shared,
                _ => CpuFunction::Vms,
            };
            for thread in 0..2 {
                let index = thread * nodes * cores + node * cores + core;
                cpus.push(CoreRecord::new(index, node, core, thread).with_function(function));
            }
        }
    }
    (cpus, (0..nodes).map(NumaNode::new).collect())
}

fn bench_build_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_summary");
    let personality = Personality::parse("controller,compute");

    for (nodes, cores) in [(1u32, 8u32), (2, 24), (4, 64)] {
        let (cpus, numa) = create_host(nodes, cores);
        group.throughput(Throughput::Elements(cpus.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}x2", nodes, cores)),
            &(cpus, numa),
            |b, (cpus, numa)| {
                b.iter(|| black_box(build_summary(cpus, Some(numa), &personality)));
            },
        );
    }

    group.finish();
}

fn bench_build_profile(c: &mut Criterion) {
    let (cpus, numa) = create_host(4, 64);

    c.bench_function("build_profile_4x64x2", |b| {
        b.iter(|| black_box(build_profile(&cpus, Some(&numa))));
    });
}

fn bench_compress_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_range");

    let contiguous: Vec<u32> = (0..512).rev().collect();
    let sparse: Vec<u32> = (0..512).filter(|i| i % 3 != 0).collect();

    group.bench_function("contiguous_512", |b| b.iter(|| black_box(compress_range(&contiguous))));
    group.bench_function("sparse_512", |b| b.iter(|| black_box(compress_range(&sparse))));

    group.finish();
}

criterion_group!(benches, bench_build_summary, bench_build_profile, bench_compress_range);
criterion_main!(benches);
