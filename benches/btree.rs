//! B+tree benchmarks.
//!
//! These measure the operations that dominate index workloads: one-shot
//! bulk construction, point lookups, and ordered scans.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bulktree::{BTree, NodeLayout};

fn layout() -> NodeLayout<u64, u64> {
    NodeLayout::new(4096).unwrap()
}

fn sorted_pairs(count: u64) -> Vec<(u64, u64)> {
    (0..count).map(|k| (k, k.wrapping_mul(31))).collect()
}

/// Deterministic probe order covering every key once (coprime stride walk).
fn scrambled_keys(count: u64) -> Vec<u64> {
    let stride = (count / 2 + 1) | 1;
    let mut key = 0u64;
    (0..count)
        .map(|_| {
            key = (key + stride) % count;
            key
        })
        .collect()
}

fn bench_bulkload(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_bulkload");

    for count in [1_000u64, 100_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("sorted", count), &count, |b, &count| {
            b.iter_with_setup(
                || sorted_pairs(count),
                |pairs| BTree::bulkload(layout(), pairs),
            );
        });
    }

    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_lookup");

    for count in [1_000u64, 100_000] {
        let tree = BTree::bulkload(layout(), sorted_pairs(count));
        let keys = scrambled_keys(count);

        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("hit", count), &count, |b, _| {
            b.iter(|| {
                for key in &keys {
                    black_box(tree.get(key));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("miss", count), &count, |b, _| {
            b.iter(|| {
                for key in &keys {
                    black_box(tree.get(&(key + count)));
                }
            });
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_scan");

    let count = 100_000u64;
    let tree = BTree::bulkload(layout(), sorted_pairs(count));

    group.throughput(Throughput::Elements(count));
    group.bench_function("full", |b| {
        b.iter(|| {
            let mut checksum = 0u64;
            for (key, value) in tree.iter() {
                checksum = checksum.wrapping_add(*key ^ *value);
            }
            black_box(checksum)
        });
    });

    let window = 1_000u64;
    group.throughput(Throughput::Elements(window));
    group.bench_function("range_1k", |b| {
        b.iter(|| {
            let lo = count / 2;
            let hi = lo + window;
            black_box(tree.find_range(&lo, &hi).count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_bulkload, bench_point_lookup, bench_scan);
criterion_main!(benches);
