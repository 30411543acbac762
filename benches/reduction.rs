use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use tile_motion::{
    analysis::diff,
    capture::{Frame, PixelFormat},
    reduction::TileReducer,
};

fn noise_frame(width: u32, height: u32, salt: u32) -> Frame {
    let pixels = (0..width * height * 4)
        .map(|i| (i.wrapping_mul(2_654_435_761).wrapping_add(salt) >> 24) as u8)
        .collect();
    Frame::new(pixels, width, height, PixelFormat::Rgba8, Duration::ZERO, 0)
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    // 0.2 scale of 640x480 and 1920x1080.
    for &(width, height) in &[(128u32, 96u32), (384, 216)] {
        let frame = noise_frame(width, height, 7);
        let reducer = TileReducer::new(4).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &frame,
            |b, frame| b.iter(|| reducer.reduce(black_box(frame)).unwrap()),
        );
    }
    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let reducer = TileReducer::new(4).unwrap();
    let a = reducer.reduce(&noise_frame(384, 216, 1)).unwrap();
    let b = reducer.reduce(&noise_frame(384, 216, 2)).unwrap();

    c.bench_function("diff_96x54", |bench| {
        bench.iter(|| diff(black_box(&a), black_box(&b)).unwrap())
    });
}

criterion_group!(benches, bench_reduce, bench_diff);
criterion_main!(benches);
