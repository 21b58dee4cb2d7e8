use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ean_reader::utils::sharpen::{sharpen, sharpen_into};
use image::{Rgb, RgbImage};

fn textured(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let bar = if (x / 3) % 2 == 0 { 30 } else { 220 };
        Rgb([bar, (bar as u32 + y) as u8, ((x ^ y) & 0xff) as u8])
    })
}

fn bench_sharpen_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharpen");
    for (w, h) in [(320, 240), (640, 480), (1920, 1080)] {
        let image = textured(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &image, |b, img| {
            b.iter(|| sharpen(black_box(img), black_box(2.5)))
        });
    }
    group.finish();
}

fn bench_sharpen_into_reuse(c: &mut Criterion) {
    let image = textured(640, 480);
    let mut out = RgbImage::new(640, 480);
    c.bench_function("sharpen_into_640x480", |b| {
        b.iter(|| sharpen_into(black_box(&image), black_box(2.5), &mut out))
    });
}

fn bench_retry_schedule(c: &mut Criterion) {
    // All strengths a full failed cycle runs through
    let image = textured(640, 480);
    let mut out = RgbImage::new(640, 480);
    c.bench_function("sharpen_schedule_640x480", |b| {
        b.iter(|| {
            for strength in 1..10 {
                sharpen_into(black_box(&image), strength as f32 / 2.0, &mut out);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_sharpen_sizes,
    bench_sharpen_into_reuse,
    bench_retry_schedule
);
criterion_main!(benches);
