//! photon-trace, an offline Monte Carlo path tracer.
//!
//! Implements a standard unidirectional path tracer over a SIMD-accelerated
//! BVH, with deferred per-kind texture evaluation and a scanline worker
//! pool. Renders straight to a PNG file rather than a terminal.
//!
//! ## Rendering equation
//!
//! ```text
//!   L_o(p, w_o) = L_e(p, w_o) + Int f_r(p, w_i, w_o) * L_i(p, w_i) * |cos theta_i| dw_i
//! ```
//!
//! Each material's `scatter` importance-samples its BRDF lobe and the
//! integrator recursively traces the scattered ray to evaluate `L_i`.

mod aabb;
mod arena;
mod attenuation;
mod bvh;
mod camera;
mod config;
mod error;
mod material;
mod math;
mod output;
mod perlin;
mod primitive;
mod rng;
mod scenes;
mod scheduler;
mod texture;
mod tracer;
mod transform;
mod world;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use config::{Cli, RenderConfig};
use scheduler::RenderSettings;

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RenderConfig::try_from(cli)?;

    rng::seed_from(config.seed);

    let scene = scenes::build(&config.scene, config.width)?;
    let camera = scene.camera;

    tracing::info!(
        scene = %config.scene,
        width = camera.image_width,
        height = camera.image_height,
        spp = config.samples_per_pixel,
        depth = config.max_depth,
        "starting render"
    );

    let settings = RenderSettings {
        samples_per_pixel: config.samples_per_pixel,
        max_depth: config.max_depth,
        background: scene.background,
        worker_threads: config.worker_threads,
    };

    let start = Instant::now();
    let pixels = scheduler::render(&scene.world, &camera, &settings);
    let elapsed = start.elapsed();

    let total_rays = camera.image_width as u64 * camera.image_height as u64 * config.samples_per_pixel as u64;
    tracing::info!(
        seconds = elapsed.as_secs_f64(),
        mrays_per_sec = total_rays as f64 / elapsed.as_secs_f64() / 1e6,
        "render complete"
    );

    output::write_png(&config.output_path, camera.image_width, camera.image_height, &pixels)?;
    tracing::info!(path = %config.output_path, "wrote image");

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
