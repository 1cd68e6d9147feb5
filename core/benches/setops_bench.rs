use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sift_core::setops::{intersect, intersect_naive};
use sift_core::skiplist::SkipList;

fn stride(n: u32, step: u32) -> SkipList {
    (0..n).map(|i| i * step).collect()
}

fn bench_intersect(c: &mut Criterion) {
    let long = stride(100_000, 1);
    let short = stride(1_000, 97);
    c.bench_function("intersect_skips", |b| {
        b.iter(|| intersect(black_box(&long), black_box(&short)))
    });
    c.bench_function("intersect_naive", |b| {
        b.iter(|| intersect_naive(black_box(&long), black_box(&short)))
    });
}

criterion_group!(benches, bench_intersect);
criterion_main!(benches);
