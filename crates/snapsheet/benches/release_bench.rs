//! Benchmark: release decision and drag hot paths.
//!
//! Run with: `cargo bench -p snapsheet --bench release_bench`
//!
//! Moves arrive at display rate and the release decision runs on the
//! gesture thread, so both must stay far below a frame budget even with
//! many snap points.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use snapsheet::snap::resolve;
use snapsheet::{BottomSheet, DragSample, SheetConfig, SheetTuning, decide_release};
use web_time::Duration;

// ===========================================================================
// Release decision
// ===========================================================================

fn bench_decide_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide_release");
    let tuning = SheetTuning::default();

    for snaps in [3usize, 16, 128] {
        let fractions: Vec<f64> = (1..=snaps).map(|i| i as f64 / snaps as f64).collect();
        let offsets = resolve(&fractions, 1000.0).expect("valid");

        group.bench_with_input(BenchmarkId::new("snap", snaps), &offsets, |b, offsets| {
            b.iter(|| {
                decide_release(
                    black_box(512.0),
                    black_box(12.0),
                    black_box(-0.4),
                    offsets,
                    &tuning,
                )
            });
        });
    }

    group.finish();
}

// ===========================================================================
// Resolution
// ===========================================================================

fn bench_resolve(c: &mut Criterion) {
    let fractions: Vec<f64> = (0..64).map(|i| ((i * 37) % 100) as f64 / 100.0).collect();
    c.bench_function("resolve_64_unsorted", |b| {
        b.iter(|| resolve(black_box(&fractions), black_box(1000.0)));
    });
}

// ===========================================================================
// Full drag
// ===========================================================================

fn bench_drag_cycle(c: &mut Criterion) {
    c.bench_function("drag_cycle_60_moves", |b| {
        let mut sheet = BottomSheet::new(SheetConfig::default(), 1000.0).expect("valid");
        sheet.set_visible(true);
        for _ in 0..300 {
            sheet.tick(Duration::from_millis(16));
        }

        b.iter(|| {
            sheet.on_grant();
            for step in 0..60 {
                let dy = f64::from(step) * 2.0;
                sheet.on_move(DragSample::vertical(dy, 0.1));
            }
            black_box(sheet.on_release(DragSample::vertical(120.0, 0.1)));
            sheet.tick(Duration::from_millis(16));
        });
    });
}

criterion_group!(benches, bench_decide_release, bench_resolve, bench_drag_cycle);
criterion_main!(benches);
