//! Benchmarks for scrolling and structural mutations.
//!
//! Run with: cargo bench -p escalator

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use escalator::{CoordinateUpdater, Escalator, EscalatorConfig, Section};

// =============================================================================
// Fixtures
// =============================================================================

fn table(rows: usize, columns: usize, spacers: usize) -> Escalator {
    let config = EscalatorConfig::default().with_size(1200.0, 800.0);
    let mut escalator = Escalator::new(config).expect("valid config");
    escalator.set_escalator_updater(Section::Body, Box::new(CoordinateUpdater));
    escalator.insert_columns(0, columns).expect("columns");
    escalator.insert_rows(Section::Body, 0, rows).expect("rows");
    let stride = (rows / spacers.max(1)).max(1);
    for row in (0..rows).step_by(stride).take(spacers) {
        escalator.set_spacer(row, 35.0).expect("spacer");
    }
    escalator
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_scroll_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalator/scroll_step");

    for rows in [1_000, 100_000, 1_000_000] {
        let mut escalator = table(rows, 20, 100);
        let mut y = 0.0;
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                y = (y + 7.0) % 10_000.0;
                escalator.set_scroll_top(black_box(y));
            })
        });
    }

    group.finish();
}

fn bench_scroll_jump(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalator/scroll_jump");

    for spacers in [0, 1_000, 10_000] {
        let mut escalator = table(100_000, 20, spacers);
        let max = escalator.scroll_height();
        let mut flip = false;
        group.bench_with_input(BenchmarkId::from_parameter(spacers), &spacers, |b, _| {
            b.iter(|| {
                flip = !flip;
                escalator.set_scroll_top(if flip { max } else { 0.0 });
            })
        });
    }

    group.finish();
}

fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalator/insert_remove_rows");

    for rows in [1_000, 100_000, 1_000_000] {
        let mut escalator = table(rows, 10, 50);
        escalator.set_scroll_top(5_000.0);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                escalator.insert_rows(Section::Body, 100, 10).expect("insert");
                escalator.remove_rows(Section::Body, 100, 10).expect("remove");
            })
        });
    }

    group.finish();
}

fn bench_horizontal_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalator/scroll_left");

    for columns in [20, 200] {
        let mut escalator = table(10_000, columns, 0);
        escalator.set_frozen_column_count(2).expect("frozen");
        let mut x = 0.0;
        group.bench_with_input(BenchmarkId::from_parameter(columns), &columns, |b, _| {
            b.iter(|| {
                x = (x + 35.0) % 5_000.0;
                escalator.set_scroll_left(black_box(x));
            })
        });
    }

    group.finish();
}

fn bench_spacer_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalator/spacer_resize");

    for spacers in [10, 1_000, 10_000] {
        let mut escalator = table(100_000, 10, spacers);
        let mut height = 10.0;
        group.bench_with_input(BenchmarkId::from_parameter(spacers), &spacers, |b, _| {
            b.iter(|| {
                height = if height > 100.0 { 10.0 } else { height + 5.0 };
                escalator.set_spacer(0, black_box(height)).expect("spacer");
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scroll_step,
    bench_scroll_jump,
    bench_insert_remove,
    bench_horizontal_scroll,
    bench_spacer_resize,
);

criterion_main!(benches);
