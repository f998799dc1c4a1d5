//! Benchmarks for selection, span lookup and edge search.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sheetgrid::{ArrayEdge, Block, Coords, Selection, SelectionPolicy};

/// A mouse drag growing the selection one row at a time, minimized once at
/// the end.
fn bench_drag_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_select");
    for rows in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut sel = Selection::new();
                for row in 0..rows {
                    sel.select_block(Block::new(row, 0, 1, 8), false);
                }
                sel.minimize();
                black_box(sel.len())
            });
        });
    }
    group.finish();
}

/// Index lookup in a store of many small spans.
fn bench_span_index(c: &mut Criterion) {
    let mut spans = Selection::with_policy(SelectionPolicy::Multiple);
    for i in 0..500 {
        spans.select_block(Block::new(i * 3, (i % 20) * 3, 2, 2), true);
    }

    c.bench_function("span_index", |b| {
        b.iter(|| {
            let mut hits = 0;
            for row in (0..1500).step_by(7) {
                if spans.index(black_box(Coords::new(row, row % 60))).is_some() {
                    hits += 1;
                }
            }
            hits
        });
    });
}

/// Pixel to row search over an edge with every size set.
fn bench_edge_find_index(c: &mut Criterion) {
    let mut edge = ArrayEdge::new(100_000, 20, 1);
    for i in (0..100_000).step_by(3) {
        edge.set_size(i, 10 + i % 30).unwrap();
    }
    let total = edge.total();

    c.bench_function("edge_find_index", |b| {
        b.iter(|| {
            let mut last = None;
            for y in (0..total).step_by(997) {
                last = edge.find_index(black_box(y), true);
            }
            last
        });
    });
}

criterion_group!(
    benches,
    bench_drag_select,
    bench_span_index,
    bench_edge_find_index
);
criterion_main!(benches);
