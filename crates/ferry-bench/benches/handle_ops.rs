//! Criterion micro-benchmarks for reference-counted handle operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ferry_bench::bench_object;

fn bench_clone_drop(c: &mut Criterion) {
    let handle = bench_object();
    c.bench_function("handle_clone_drop", |b| {
        b.iter(|| {
            let copy = black_box(&handle).clone();
            drop(black_box(copy));
        });
    });
}

fn bench_clone_from(c: &mut Criterion) {
    let source = bench_object();
    let mut target = bench_object();
    c.bench_function("handle_clone_from_alias", |b| {
        b.iter(|| {
            target.clone_from(black_box(&source));
        });
    });
}

fn bench_take(c: &mut Criterion) {
    let mut handle = bench_object();
    c.bench_function("handle_take_and_restore", |b| {
        b.iter(|| {
            let moved = handle.take();
            handle = black_box(moved);
        });
    });
}

fn bench_adopt_release(c: &mut Criterion) {
    c.bench_function("handle_adopt_release", |b| {
        b.iter(|| {
            drop(black_box(bench_object()));
        });
    });
}

criterion_group!(
    benches,
    bench_clone_drop,
    bench_clone_from,
    bench_take,
    bench_adopt_release
);
criterion_main!(benches);
