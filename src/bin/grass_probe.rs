//! Headless grass probe: synthesize and shape one frame, print a JSON summary.
//!
//! Usage: cargo run --release --bin grass_probe -- [--config grass.json]
//!        [--time 2.5] [--camera 0,1.7,-8] [--terrain flat|generated] [--gpu]

use std::time::Instant;

use glam::Vec3;
use serde_json::json;

use meadow::core::camera::{Camera, DirectionalLight};
use meadow::core::Error;
use meadow::grass::{BladeRecord, BladeType, FrameContext, GrassConfig, GrassSystem};
use meadow::render::{GpuContext, GrassRenderer};
use meadow::terrain::{PlaneTerrain, TerrainGenerator, TerrainParams, TerrainSampler};

const TARGET_WIDTH: u32 = 640;
const TARGET_HEIGHT: u32 = 360;

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_vec3(s: &str) -> Result<Vec3, Error> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| Error::Config(format!("bad vector '{}': {}", s, e)))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(Error::Config(format!("expected x,y,z, got '{}'", s))),
    }
}

/// Largest absolute difference over the fields derived purely from hashes.
fn hash_field_deviation(cpu: &[BladeRecord], gpu: &[BladeRecord]) -> f32 {
    cpu.iter()
        .zip(gpu)
        .map(|(a, b)| {
            [
                (a.height - b.height).abs(),
                (a.width - b.width).abs(),
                (a.bend - b.bend).abs(),
                (a.presence - b.presence).abs(),
                (a.clump_seed - b.clump_seed).abs(),
                (a.per_blade_hash - b.per_blade_hash).abs(),
                (a.lod_seed - b.lod_seed).abs(),
                (a.to_center - b.to_center).abs().max_element(),
            ]
            .into_iter()
            .fold(0.0f32, f32::max)
        })
        .fold(0.0, f32::max)
}

fn main() -> Result<(), Error> {
    meadow::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match arg_value(&args, "--config") {
        Some(path) => GrassConfig::load(path)?,
        None => GrassConfig::default(),
    };
    let time = match arg_value(&args, "--time") {
        Some(t) => t
            .parse::<f32>()
            .map_err(|e| Error::Config(format!("bad --time '{}': {}", t, e)))?,
        None => 0.0,
    };
    let camera_position = match arg_value(&args, "--camera") {
        Some(s) => parse_vec3(s)?,
        None => Vec3::new(0.0, 1.7, -8.0),
    };
    let terrain: Box<dyn TerrainSampler> = match arg_value(&args, "--terrain") {
        Some("generated") => Box::new(TerrainGenerator::new(TerrainParams::default())),
        Some("flat") | None => Box::new(PlaneTerrain::flat(0.0)),
        Some(other) => return Err(Error::Config(format!("unknown terrain '{}'", other))),
    };
    let use_gpu = args.iter().any(|a| a == "--gpu");

    let origin = Vec3::from(config.patch.origin);
    let mut camera = Camera::look_at(camera_position, origin, Vec3::Y);
    camera.set_aspect(TARGET_WIDTH as f32, TARGET_HEIGHT as f32);
    let frame = FrameContext::new(&camera, &DirectionalLight::default(), time);

    let system = GrassSystem::new(config);

    let start = Instant::now();
    let records = system.synthesize(time);
    let synth_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let mesh = system.shape_frame(&records, &frame, terrain.as_ref());
    let shape_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut per_type = [0usize; 3];
    for r in &records {
        per_type[r.blade_type().index()] += 1;
    }
    let count = records.len().max(1) as f32;
    let mean_height = records.iter().map(|r| r.height).sum::<f32>() / count;
    let mean_wind = records.iter().map(|r| r.wind_strength).sum::<f32>() / count;
    let max_wind = records.iter().map(|r| r.wind_strength).fold(0.0f32, f32::max);

    let mut summary = json!({
        "blades": records.len(),
        "time": time,
        "camera": [camera_position.x, camera_position.y, camera_position.z],
        "types": {
            "low_bend": per_type[BladeType::LowBend.index()],
            "mid_bend": per_type[BladeType::MidBend.index()],
            "high_bend": per_type[BladeType::HighBend.index()],
        },
        "visible_blades": mesh.visible_blades,
        "vertices": mesh.vertex_count(),
        "triangles": mesh.triangle_count(),
        "mean_height": mean_height,
        "wind": { "mean": mean_wind, "max": max_wind },
        "cpu_ms": { "synthesize": synth_ms, "shape": shape_ms },
    });

    if use_gpu {
        let ctx = GpuContext::new_headless_blocking()?;
        let renderer = GrassRenderer::new(&ctx, &system, terrain.as_ref(), TARGET_WIDTH, TARGET_HEIGHT);
        let gpu_records = renderer.synthesize(&ctx, &system, &frame)?;
        let deviation = hash_field_deviation(&records, &gpu_records);
        renderer.render_frame(&ctx, &system, &frame);
        ctx.wait_idle()?;
        log::info!("GPU records read back, max hash-field deviation {:.2e}", deviation);
        summary["gpu"] = json!({
            "blades": gpu_records.len(),
            "max_hash_field_deviation": deviation,
        });
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
