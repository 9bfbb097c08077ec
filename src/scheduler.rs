//! Scanline scheduler: a fixed worker pool pulls scanline indices off a
//! shared atomic counter, renders each row into disjoint slices of the
//! output buffer, and a dedicated reporter thread prints progress as rows
//! complete.
//!
//! The wake-on-decrement in the original uses a futex-style atomic wait;
//! the stable equivalent here is a `Condvar` guarding the remaining count.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};

use crate::attenuation::AttenuationEngine;
use crate::camera::Camera;
use crate::math::Color;
use crate::rng;
use crate::tracer;
use crate::world::World;

pub struct RenderSettings {
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub background: Color,
    /// `None` defaults to `std::thread::available_parallelism()`.
    pub worker_threads: Option<usize>,
}

struct Progress {
    remaining: Mutex<u32>,
    changed: Condvar,
}

impl Progress {
    fn new(total: u32) -> Self {
        Self {
            remaining: Mutex::new(total),
            changed: Condvar::new(),
        }
    }

    fn decrement(&self) {
        let mut remaining = self.remaining.lock().unwrap();
        *remaining -= 1;
        self.changed.notify_one();
    }

    /// Blocks until `remaining` differs from `last`, then returns the new value.
    fn wait_for_change(&self, last: u32) -> u32 {
        let guard = self.remaining.lock().unwrap();
        let guard = self
            .changed
            .wait_while(guard, |remaining| *remaining == last)
            .unwrap();
        *guard
    }
}

/// A pixel buffer workers write into through disjoint row slices. Safe
/// because the scheduler only ever hands out a given row index to one
/// worker (`tileid.fetch_add` is exclusive).
struct RowBuffer {
    ptr: *mut Color,
    width: usize,
}

unsafe impl Sync for RowBuffer {}

impl RowBuffer {
    unsafe fn write_row(&self, row: usize, data: &[Color]) {
        let dst = self.ptr.add(row * self.width);
        std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
    }
}

/// Renders the full image, returning a row-major `width * height` pixel
/// buffer in linear color space (no tone mapping applied yet).
pub fn render(world: &World, camera: &Camera, settings: &RenderSettings) -> Vec<Color> {
    let width = camera.image_width as usize;
    let height = camera.image_height as usize;
    let mut pixels = vec![Color::zero(); width * height];

    let tileid = AtomicU32::new(0);
    let progress = Progress::new(height as u32);
    let worker_count = settings
        .worker_threads
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

    let buffer = RowBuffer {
        ptr: pixels.as_mut_ptr(),
        width,
    };

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let mut last = height as u32 + 1;
            loop {
                let remaining = progress.wait_for_change(last);
                last = remaining;
                tracing::info!(remaining, total = height, "scanlines remaining");
                if remaining == 0 {
                    break;
                }
            }
        });

        for _ in 0..worker_count {
            let tileid = &tileid;
            let progress = &progress;
            let buffer = &buffer;
            scope.spawn(move || {
                let mut row = vec![Color::zero(); width];
                let mut engine = AttenuationEngine::new(settings.samples_per_pixel as usize);
                loop {
                    let j = tileid.fetch_add(1, Ordering::AcqRel);
                    if j as usize >= height {
                        return;
                    }
                    render_scanline(world, camera, settings, j as usize, &mut row, &mut engine);
                    unsafe { buffer.write_row(j as usize, &row) };
                    progress.decrement();
                }
            });
        }
    });

    pixels
}

fn render_scanline(
    world: &World,
    camera: &Camera,
    settings: &RenderSettings,
    j: usize,
    row: &mut [Color],
    engine: &mut AttenuationEngine,
) {
    rng::with_thread_rng(|rng| {
        for (i, pixel) in row.iter_mut().enumerate() {
            engine.clear();
            for sample in 0..settings.samples_per_pixel as usize {
                engine.begin_sample();
                let ray = camera.get_ray(i as u32, j as u32, rng);
                let color = tracer::trace(settings.background, ray, settings.max_depth, world, engine, rng);
                engine.finish_sample(sample, color);
            }
            *pixel = engine.resolve_pixel(&world.textures);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::material::Material;
    use crate::math::{Point3, Vec3};
    use crate::primitive::Primitive;
    use crate::texture::Texture;
    use crate::world::{Object, World};

    #[test]
    fn render_produces_one_pixel_per_row_and_column() {
        let world = World::build(
            vec![Object::new(Primitive::Sphere {
                center1: Point3::new(0.0, 0.0, -1.0),
                motion: Vec3::zero(),
                radius: 0.5,
            })],
            vec![Material::Lambertian],
            vec![Texture::solid(Color::new(0.5, 0.5, 0.5))],
            vec![],
        );
        let camera = Camera::new(&CameraConfig {
            image_width: 8,
            aspect_ratio: 2.0,
            ..CameraConfig::default()
        });
        let settings = RenderSettings {
            samples_per_pixel: 2,
            max_depth: 4,
            background: Color::new(0.5, 0.7, 1.0),
            worker_threads: Some(2),
        };
        let pixels = render(&world, &camera, &settings);
        assert_eq!(pixels.len(), camera.image_width as usize * camera.image_height as usize);
    }
}
