//! Per-ray bounce loop: the Monte-Carlo core of the renderer.
//!
//! Written iteratively rather than recursively, the original recurses per
//! bounce, but an explicit loop avoids a stack frame per depth level and
//! keeps `depth` a plain counter instead of a call argument.

use rand::Rng;

use crate::attenuation::AttenuationEngine;
use crate::math::{Color, Ray, Vec3};
use crate::primitive::face_normal;
use crate::world::World;

/// Traces one camera ray through up to `max_depth` bounces, queuing every
/// touched texture into `engine` and returning the path's terminal color
/// (background, emission, or black) before attenuation is folded in.
pub fn trace(
    background: Color,
    mut ray: Ray,
    mut depth: u32,
    world: &World,
    engine: &mut AttenuationEngine,
    rng: &mut dyn rand::RngCore,
) -> Color {
    loop {
        if depth == 0 {
            engine.reset();
            return Color::zero();
        }

        let mut closest = f64::INFINITY;
        let hit = world.hit_select(&ray, &mut closest);
        let max_t = if hit.is_some() { closest } else { f64::INFINITY };

        if let Some((t, color)) = world.sample_constant_mediums(&ray, max_t, rng) {
            engine.emplace_solid(color);
            ray = Ray::new(ray.at(t), Vec3::random_unit_vector(rng), ray.time);
            depth -= 1;
            continue;
        }

        let Some((index, rec)) = hit else {
            engine.reset();
            return background;
        };

        let (normal, front_face) = face_normal(ray.direction, rec.normal);
        let material = &world.materials[index];
        let texture = &world.textures[index];

        if material.is_emissive() {
            engine.emplace(index, texture, rec.uv, rec.p);
            return Color::ones();
        }

        let Some(scattered) = material.scatter(ray.direction, normal, front_face, rng) else {
            engine.reset();
            return Color::zero();
        };

        engine.emplace(index, texture, rec.uv, rec.p);
        ray = Ray::new(rec.p, scattered, ray.time);
        depth -= 1;
    }
}
