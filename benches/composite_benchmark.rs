//! Compositing benchmark: Measure per-tick frame blending performance.
//!
//! Target: < 50µs for a 128×32 frame (one composite per effect tick)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use visor::{Frame, Rgb};

/// Create a frame with varied content for benchmarking.
fn create_test_frame(width: u32, height: u32, seed: u32) -> Frame {
    let mut frame = Frame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            frame.set(
                x,
                y,
                Rgb::new(
                    ((x * 3 + seed) % 256) as u8,
                    ((y * 7 + seed) % 256) as u8,
                    ((x + y + seed) % 256) as u8,
                ),
            );
        }
    }
    frame
}

fn composite_max(c: &mut Criterion) {
    let base = create_test_frame(128, 32, 0);
    let overlay = create_test_frame(128, 32, 1);

    c.bench_function("composite_max_128x32", |b| {
        b.iter(|| black_box(&base).composite_max(black_box(&overlay)))
    });
}

fn lerp_midpoint(c: &mut Criterion) {
    let from = create_test_frame(128, 32, 0);
    let to = create_test_frame(128, 32, 1);

    c.bench_function("lerp_128x32_midpoint", |b| {
        b.iter(|| black_box(&from).lerp(black_box(&to), black_box(0.5)))
    });
}

fn frame_clone(c: &mut Criterion) {
    let frame = create_test_frame(128, 32, 0);

    c.bench_function("clone_128x32", |b| b.iter(|| black_box(&frame).clone()));
}

fn encode_png(c: &mut Criterion) {
    let frame = create_test_frame(128, 32, 0);

    c.bench_function("encode_png_128x32", |b| {
        b.iter(|| black_box(&frame).encode_png().unwrap())
    });
}

fn composite_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_by_size");

    for (width, height) in [(64, 16), (128, 32), (192, 48), (256, 64)] {
        let base = create_test_frame(width, height, 0);
        let overlay = create_test_frame(width, height, 1);

        group.bench_with_input(
            BenchmarkId::new("max", format!("{width}x{height}")),
            &(base, overlay),
            |b, (base, overlay)| b.iter(|| black_box(base).composite_max(black_box(overlay))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    composite_max,
    lerp_midpoint,
    frame_clone,
    encode_png,
    composite_various_sizes,
);
criterion_main!(benches);
