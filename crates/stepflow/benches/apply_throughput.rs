//! Apply throughput benchmark
//!
//! Measures the driver's own overhead: compiling item trees and walking
//! a flow to completion with no-op activities.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::future::join_all;
use tokio::runtime::Runtime;

use stepflow::{State, StepFlow, Steps};

fn sequential_flow(steps: usize) -> StepFlow<()> {
    (0..steps)
        .fold(Steps::new(), |seq, i| {
            seq.step(format!("step-{}", i), |_ctx: ()| async { Ok(()) })
        })
        .compile("bench")
        .unwrap()
}

async fn run_to_completion(flow: &StepFlow<()>) -> usize {
    let mut state = State::new();
    let mut calls = 0;
    while !flow.is_completed(&state) {
        state = flow.apply(&(), &state).await.unwrap();
        calls += 1;
    }
    calls
}

/// Benchmark compiling sequences of increasing length
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_throughput/compile");

    for steps in [10, 100, 1000] {
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::new("steps", steps), &steps, |b, &steps| {
            b.iter(|| sequential_flow(steps));
        });
    }

    group.finish();
}

/// Benchmark driving one instance to completion
fn bench_apply_sequential(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("apply_throughput/sequential");

    for steps in [10, 100] {
        let flow = sequential_flow(steps);
        group.throughput(Throughput::Elements(steps as u64 + 1));
        group.bench_with_input(BenchmarkId::new("steps", steps), &flow, |b, flow| {
            b.to_async(&rt).iter(|| run_to_completion(flow));
        });
    }

    group.finish();
}

/// Benchmark many instances sharing one compiled flow
fn bench_apply_concurrent(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("apply_throughput/concurrent");
    group.sample_size(20);

    let flow = Arc::new(sequential_flow(20));
    for instances in [10, 100, 1000] {
        group.throughput(Throughput::Elements(instances as u64));
        group.bench_with_input(
            BenchmarkId::new("instances", instances),
            &instances,
            |b, &instances| {
                b.to_async(&rt).iter(|| {
                    let flow = flow.clone();
                    async move {
                        let runs = (0..instances).map(|_| {
                            let flow = flow.clone();
                            tokio::spawn(async move { run_to_completion(&flow).await })
                        });
                        join_all(runs).await
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_apply_sequential,
    bench_apply_concurrent,
);

criterion_main!(benches);
