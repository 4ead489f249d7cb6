//! Benchmarks for cache rebuilds and geometry queries through a layer stack.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridlayers::{Axis, DataLayer, GroupLayer, HideShowLayer, Layer, LayerCommand, ReorderLayer};

type Stack = GroupLayer<HideShowLayer<ReorderLayer<DataLayer>>>;

/// A stack with every tenth column hidden and a few collapsed groups.
fn busy_stack(columns: usize) -> Stack {
    let mut grid = GroupLayer::new(
        HideShowLayer::new(ReorderLayer::new(DataLayer::with_counts(columns, 100))),
        Axis::Column,
    );
    grid.do_command(&LayerCommand::HideIndexes {
        axis: Axis::Column,
        indexes: (0..columns).step_by(10).collect(),
    });
    for start in (5..columns.saturating_sub(5)).step_by(100) {
        let name = format!("g{start}");
        grid.add_group(&name, &(start..start + 4).collect::<Vec<_>>());
        grid.set_collapsed(&name, true);
    }
    grid
}

/// Hide and show one column, forcing the maps to rebuild on the next query
fn bench_cache_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_rebuild");

    for columns in [1_000, 10_000, 100_000] {
        let mut grid = busy_stack(columns);
        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::new("hide_show", columns), &columns, |b, &n| {
            b.iter(|| {
                let index = n / 2 + 1;
                grid.do_command(&LayerCommand::HideIndexes {
                    axis: Axis::Column,
                    indexes: vec![index],
                });
                grid.do_command(&LayerCommand::ShowIndexes {
                    axis: Axis::Column,
                    indexes: vec![index],
                });
                black_box(grid.index_at(Axis::Column, n / 3))
            })
        });
    }

    group.finish();
}

/// Offsets and sizes of every position with warm caches
fn bench_geometry_scan(c: &mut Criterion) {
    let grid = busy_stack(10_000);
    let count = grid.count(Axis::Column);
    black_box(grid.total_size(Axis::Column));

    c.bench_function("geometry_scan_10000", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for position in 0..count {
                sum += u64::from(grid.start_offset_at(Axis::Column, position).unwrap_or(0));
                sum += u64::from(grid.size_at(Axis::Column, position).unwrap_or(0));
            }
            black_box(sum)
        })
    });
}

/// Pixel offset to position, as a mouse move would
fn bench_hit_test(c: &mut Criterion) {
    let grid = busy_stack(10_000);
    let total = grid.total_size(Axis::Column);

    c.bench_function("hit_test_10000", |b| {
        let mut offset = 0u32;
        b.iter(|| {
            offset = (offset + 7_919) % total.max(1);
            black_box(grid.position_at_offset(Axis::Column, offset))
        })
    });
}

/// Reorder a column across the grid and back
fn bench_reorder(c: &mut Criterion) {
    let mut grid = busy_stack(10_000);

    c.bench_function("reorder_10000", |b| {
        b.iter(|| {
            grid.do_command(&LayerCommand::Reorder {
                axis: Axis::Column,
                from: vec![1],
                to: 8_000,
            });
            grid.do_command(&LayerCommand::Reorder {
                axis: Axis::Column,
                from: vec![7_999],
                to: 1,
            });
            black_box(grid.index_at(Axis::Column, 1))
        })
    });
}

criterion_group!(
    benches,
    bench_cache_rebuild,
    bench_geometry_scan,
    bench_hit_test,
    bench_reorder,
);

criterion_main!(benches);
