//! Benchmark for OrderedCollection and OrderedMap vs standard BTreeSet/BTreeMap.
//!
//! Compares the persistent tree against the standard B-tree collections for
//! insertion, lookup, removal, extremes and iteration.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use persistent_llrb::{OrderedCollection, OrderedMap};
use std::collections::{BTreeMap, BTreeSet};

const SIZES: [i32; 3] = [100, 1000, 10000];

// =============================================================================
// add Benchmark
// =============================================================================

fn benchmark_add(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("add");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("OrderedCollection", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut collection = OrderedCollection::new();
                    for index in 0..size {
                        collection.add(black_box(index)).unwrap();
                    }
                    black_box(collection)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeSet", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set = BTreeSet::new();
                    for index in 0..size {
                        set.insert(black_box(index));
                    }
                    black_box(set)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in SIZES {
        let persistent_map: OrderedMap<i32, i32> =
            (0..size).map(|index| (index, index * 2)).collect();
        let standard_map: BTreeMap<i32, i32> = (0..size).map(|index| (index, index * 2)).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderedMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Ok(Some(&value)) = persistent_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = standard_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// discard Benchmark
// =============================================================================

fn benchmark_discard(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("discard");

    for size in SIZES {
        let persistent: OrderedCollection<i32> = (0..size).collect();
        let standard: BTreeSet<i32> = (0..size).collect();

        // Cloning the persistent collection is O(1), so every iteration
        // starts from the same shared version.
        group.bench_with_input(
            BenchmarkId::new("OrderedCollection", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut collection = persistent.clone();
                    for value in (0..size).step_by(2) {
                        collection.discard(&black_box(value)).unwrap();
                    }
                    black_box(collection)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeSet", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set = standard.clone();
                    for value in (0..size).step_by(2) {
                        set.remove(&black_box(value));
                    }
                    black_box(set)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// pop_min Benchmark
// =============================================================================

fn benchmark_pop_min(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("pop_min");

    for size in SIZES {
        let persistent: OrderedCollection<i32> = (0..size).collect();
        let standard: BTreeSet<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderedCollection", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut collection = persistent.clone();
                    while let Ok(value) = collection.pop_min() {
                        black_box(value);
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut set = standard.clone();
                while let Some(value) = set.pop_first() {
                    black_box(value);
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in SIZES {
        let persistent: OrderedCollection<i32> = (0..size).collect();
        let standard: BTreeSet<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderedCollection", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(persistent.iter().copied().sum::<i32>()));
            },
        );

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| black_box(standard.iter().copied().sum::<i32>()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_add,
    benchmark_get,
    benchmark_discard,
    benchmark_pop_min,
    benchmark_iteration
);

criterion_main!(benches);
