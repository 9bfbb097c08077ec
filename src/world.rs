//! Scene container: primitives (each wrapped in its own transform stack),
//! the BVH built over them, their materials and textures, and the
//! constant-density media registered against specific primitives.

use rand::Rng;

use crate::aabb::Aabb;
use crate::bvh::Bvh;
use crate::math::{Color, Interval, Ray};
use crate::material::Material;
use crate::primitive::{ConstantMedium, HitRecord, Hittable, Primitive};
use crate::texture::Texture;
use crate::transform::{self, Transform};

/// A primitive plus the ordered transform stack applied to it. Implements
/// [`Hittable`] by mapping the ray into local space, delegating to the
/// wrapped primitive, and mapping the resulting hit record back out.
#[derive(Debug, Clone)]
pub struct Object {
    pub primitive: Primitive,
    pub transforms: Vec<Transform>,
}

impl Object {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            transforms: Vec::new(),
        }
    }

    pub fn with_transforms(primitive: Primitive, transforms: Vec<Transform>) -> Self {
        Self { primitive, transforms }
    }
}

impl Hittable for Object {
    fn bounding_box(&self) -> Aabb {
        transform::apply_all_to_bbox(&self.transforms, self.primitive.bounding_box())
    }

    fn hit(&self, ray: &Ray, bounds: Interval) -> Option<HitRecord> {
        if self.transforms.is_empty() {
            return self.primitive.hit(ray, bounds);
        }
        let local_ray = transform::apply_all(&self.transforms, *ray);
        let mut rec = self.primitive.hit(&local_ray, bounds)?;
        transform::apply_all_reverse(&self.transforms, ray.time, &mut rec);
        Some(rec)
    }
}

pub struct World {
    objects: Vec<Object>,
    bvh: Bvh,
    /// Indexed in parallel with `objects`.
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub media: Vec<ConstantMedium>,
}

impl World {
    pub fn build(objects: Vec<Object>, materials: Vec<Material>, textures: Vec<Texture>, media: Vec<ConstantMedium>) -> Self {
        assert_eq!(objects.len(), materials.len());
        assert_eq!(objects.len(), textures.len());
        let bvh = Bvh::build(&objects);
        Self {
            objects,
            bvh,
            materials,
            textures,
            media,
        }
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn root_bbox(&self) -> Aabb {
        self.bvh.root_bbox()
    }

    pub fn hit_select(&self, ray: &Ray, closest: &mut f64) -> Option<(usize, HitRecord)> {
        self.bvh.hit_select(&self.objects, ray, closest)
    }

    /// Stochastically samples every registered constant medium along `ray`
    /// up to `max_t`. When more than one medium's boundary is crossed, the
    /// one with the nearest scatter event fires, mirroring `hit_select`'s
    /// closest-first tie-break across ordinary surfaces.
    pub fn sample_constant_mediums(&self, ray: &Ray, max_t: f64, rng: &mut dyn rand::RngCore) -> Option<(f64, Color)> {
        let mut best: Option<(f64, Color)> = None;

        for medium in &self.media {
            let boundary = &self.objects[medium.boundary];

            let Some(mut rec1) = boundary.hit(ray, Interval::UNIVERSE) else {
                continue;
            };
            let Some(mut rec2) = boundary.hit(ray, Interval::new(rec1.t + 0.0001, f64::INFINITY)) else {
                continue;
            };

            if rec1.t < crate::bvh::MIN_RAY_DIST {
                rec1.t = crate::bvh::MIN_RAY_DIST;
            }
            if rec2.t > max_t {
                rec2.t = max_t;
            }
            if rec1.t >= rec2.t {
                continue;
            }
            rec1.t = rec1.t.max(0.0);

            let ray_length = ray.direction.length();
            let distance_inside_boundary = (rec2.t - rec1.t) * ray_length;
            let hit_distance = medium.neg_inv_density * rng.gen::<f64>().ln();
            if hit_distance > distance_inside_boundary {
                continue;
            }

            let t = rec1.t + hit_distance / ray_length;
            match &best {
                Some((best_t, _)) if *best_t <= t => {}
                _ => best = Some((t, medium.color)),
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vec3};
    use crate::rng::Lcg32;

    fn sphere_object(x: f64) -> Object {
        Object::new(Primitive::Sphere {
            center1: Point3::new(x, 0.0, 0.0),
            motion: Vec3::zero(),
            radius: 0.5,
        })
    }

    #[test]
    fn hit_select_respects_transform_stack() {
        let untransformed = sphere_object(0.0);
        let transformed = Object::with_transforms(
            Primitive::Sphere {
                center1: Point3::zero(),
                motion: Vec3::zero(),
                radius: 0.5,
            },
            vec![Transform::Translate(Vec3::new(5.0, 0.0, 0.0))],
        );

        let world = World::build(
            vec![untransformed, transformed],
            vec![Material::Lambertian, Material::Lambertian],
            vec![Texture::solid(Color::new(1.0, 1.0, 1.0)), Texture::solid(Color::new(1.0, 1.0, 1.0))],
            vec![],
        );

        let ray = Ray::new(Point3::new(5.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let mut closest = f64::INFINITY;
        let (idx, rec) = world.hit_select(&ray, &mut closest).unwrap();
        assert_eq!(idx, 1);
        assert!((rec.p.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn constant_medium_scatters_inside_boundary_box() {
        let boundary = Object::new(Primitive::Box {
            bbox: Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)),
        });
        let world = World::build(
            vec![boundary],
            vec![Material::Isotropic],
            vec![Texture::solid(Color::new(1.0, 1.0, 1.0))],
            vec![ConstantMedium::new(0, 10.0, Color::new(1.0, 1.0, 1.0))],
        );

        let mut rng = Lcg32::new(7);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let mut hits = 0;
        for _ in 0..50 {
            if world.sample_constant_mediums(&ray, f64::INFINITY, &mut rng).is_some() {
                hits += 1;
            }
        }
        assert!(hits > 0, "a dense medium should scatter at least sometimes over 50 trials");
    }

    #[test]
    fn constant_medium_never_fires_outside_max_t() {
        let boundary = Object::new(Primitive::Box {
            bbox: Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)),
        });
        let world = World::build(
            vec![boundary],
            vec![Material::Isotropic],
            vec![Texture::solid(Color::new(1.0, 1.0, 1.0))],
            vec![ConstantMedium::new(0, 10.0, Color::new(1.0, 1.0, 1.0))],
        );

        let mut rng = Lcg32::new(9);
        // Ray never reaches the boundary box.
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(world.sample_constant_mediums(&ray, 1.0, &mut rng).is_none());
    }

    #[test]
    fn density_one_medium_has_unit_mean_free_path() {
        // A boundary large enough that the exponential free-path draw never
        // gets censored by the far wall, with the camera already inside it
        // (clamped entry at t=0), isolates the free-path distribution from
        // boundary geometry entirely.
        let boundary = Object::new(Primitive::Box {
            bbox: Aabb::new(Point3::new(-1000.0, -1000.0, -1000.0), Point3::new(1000.0, 1000.0, 1000.0)),
        });
        let world = World::build(
            vec![boundary],
            vec![Material::Isotropic],
            vec![Texture::solid(Color::new(1.0, 1.0, 1.0))],
            vec![ConstantMedium::new(0, 1.0, Color::new(1.0, 1.0, 1.0))],
        );

        let mut rng = Lcg32::new(123);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let trials = 10_000;
        let mut total = 0.0;
        for _ in 0..trials {
            let (t, _) = world.sample_constant_mediums(&ray, f64::INFINITY, &mut rng).expect("boundary is effectively infinite");
            total += t;
        }
        let mean = total / trials as f64;
        // The theoretical mean free path is 1/density = 1. A 0.1 absolute
        // tolerance is roughly ten standard errors for 10,000 draws, wide
        // enough to hold for any reasonable PRNG rather than just one seed.
        assert!((mean - 1.0).abs() < 0.1, "mean free path {mean} deviates from the expected 1.0");
    }
}
