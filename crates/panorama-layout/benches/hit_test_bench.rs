//! Hit-test and cascade throughput.
//!
//! Run with: cargo bench -p panorama-layout --bench hit_test_bench

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use panorama_layout::{CellLocation, GridConfig, GridGeometry, ItemId, PageStore, Point, Sides};

fn bench_hit_test(c: &mut Criterion) {
    let geometry = GridGeometry::new(GridConfig {
        padding: Sides::all(12.0),
        ..GridConfig::default()
    });
    let mut group = c.benchmark_group("grid/hit_test");
    for pages in [1usize, 16, 256] {
        let span = geometry.panel_size(pages);
        let points: Vec<Point> = (0..1024)
            .map(|i| {
                let f = i as f64 / 1024.0;
                Point::new(f * span.width, (1.0 - f) * span.height)
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(pages), &points, |b, points| {
            b.iter(|| {
                for &point in points {
                    black_box(geometry.hit_test(black_box(point), pages));
                }
            });
        });
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/front_insert_cascade");
    for items in [64u64, 1024, 8192] {
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            b.iter_batched(
                || PageStore::from_items(12, (0..items).map(ItemId)).expect("unique ids"),
                |mut store| {
                    let last = store.page_count() - 1;
                    let from = CellLocation::new(last, store.pages()[last].len() - 1);
                    black_box(
                        store
                            .move_within_cascade(from, CellLocation::new(0, 0))
                            .expect("valid move"),
                    );
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hit_test, bench_cascade);
criterion_main!(benches);
