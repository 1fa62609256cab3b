use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::Vec3;

use meadow::core::camera::{Camera, DirectionalLight};
use meadow::grass::{FrameContext, GrassConfig, GrassSystem};
use meadow::terrain::PlaneTerrain;

fn field(grid_size: u32) -> GrassSystem {
    let mut config = GrassConfig::default();
    config.patch.grid_size = grid_size;
    GrassSystem::new(config)
}

fn frame(time: f32) -> FrameContext {
    let camera = Camera::look_at(Vec3::new(0.0, 1.7, -8.0), Vec3::ZERO, Vec3::Y);
    FrameContext::new(&camera, &DirectionalLight::default(), time)
}

fn bench_synthesize_64(c: &mut Criterion) {
    let system = field(64);

    c.bench_function("synthesize_64", |b| {
        b.iter(|| system.synthesize(black_box(1.5)));
    });
}

fn bench_synthesize_256(c: &mut Criterion) {
    let system = field(256);

    c.bench_function("synthesize_256", |b| {
        b.iter(|| system.synthesize(black_box(1.5)));
    });
}

fn bench_shape_frame_64(c: &mut Criterion) {
    let system = field(64);
    let records = system.synthesize(1.5);
    let frame = frame(1.5);
    let terrain = PlaneTerrain::flat(0.0);

    c.bench_function("shape_frame_64", |b| {
        b.iter(|| system.shape_frame(black_box(&records), &frame, &terrain));
    });
}

criterion_group!(
    benches,
    bench_synthesize_64,
    bench_synthesize_256,
    bench_shape_frame_64,
);
criterion_main!(benches);
