use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use image::{DynamicImage, ImageBuffer, Rgb};

use batchmark::{Config, TransformPipeline};

fn synthetic_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

fn benchmark_transform(c: &mut Criterion) {
    let pipeline = TransformPipeline::from_config(&Config::default());

    let mut group = c.benchmark_group("transform");
    for (name, width, height) in [
        ("small_256", 256, 256),
        ("medium_1024", 1024, 768),
        ("large_3000", 3000, 2000),
    ] {
        let input = synthetic_image(width, height);
        group.bench_function(name, |b| {
            b.iter_batched(
                || input.clone(),
                |img| pipeline.apply(&img),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_transform);
criterion_main!(benches);
