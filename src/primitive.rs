//! Geometric primitives: sphere, axis-aligned quad, general quad, and box.
//!
//! Each variant is dispatched by a single match in [`Primitive::hit`] rather
//! than through a trait object, the set is closed (§3 of the design notes)
//! and keeping it monomorphic lets the BVH's hot inner loop inline freely.

use crate::aabb::Aabb;
use crate::math::{Interval, Point3, Ray, Vec3};
use crate::texture::Uv;

const PARALLEL_EPS: f64 = 1e-8;

#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    /// A sphere whose center moves linearly with the ray's time sample:
    /// `center(t) = center1 + t * motion`. A stationary sphere has `motion
    /// == Vec3::zero()`.
    Sphere {
        center1: Point3,
        motion: Vec3,
        radius: f64,
    },
    /// A quad lying in the plane `x[axis] == q[axis]`, spanning `[0,u]` and
    /// `[0,v]` along the other two axes in cyclic order.
    AaQuad {
        q: Point3,
        axis: usize,
        u: f64,
        v: f64,
    },
    /// A general parallelogram with corner `q` and edge vectors `u`, `v`.
    Quad { q: Point3, u: Vec3, v: Vec3 },
    /// An axis-aligned box given by its own bounding box.
    Box { bbox: Aabb },
}

/// Everything the tracer needs about a surface intersection, prior to
/// looking up the hit primitive's material/texture.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub t: f64,
    pub p: Point3,
    pub normal: Vec3,
    pub uv: Uv,
    pub front_face: bool,
}

/// Orients `normal` to face against `in_dir` and reports whether the hit was
/// on the front (outward-facing) side.
pub fn face_normal(in_dir: Vec3, normal: Vec3) -> (Vec3, bool) {
    let front_face = in_dir.dot(normal) < 0.0;
    (if front_face { normal } else { -normal }, front_face)
}

fn is_interior(a: f64, b: f64) -> bool {
    Interval::UNIT.contains(a) && Interval::UNIT.contains(b)
}

impl Primitive {
    pub fn bounding_box(&self) -> Aabb {
        match *self {
            Primitive::Sphere {
                center1,
                motion,
                radius,
            } => {
                let r = Vec3::new(radius, radius, radius);
                let box1 = Aabb::new(center1 - r, center1 + r);
                if motion.near_zero() {
                    return box1;
                }
                let center2 = center1 + motion;
                let box2 = Aabb::new(center2 - r, center2 + r);
                Aabb::union(box1, box2)
            }
            Primitive::AaQuad { q, axis, u, v } => {
                let uaxis = (axis + 1) % 3;
                let vaxis = (axis + 2) % 3;
                let mut uvec = Vec3::zero();
                uvec[uaxis] = u;
                let mut vvec = Vec3::zero();
                vvec[vaxis] = v;
                let diag1 = Aabb::new(q, q + uvec + vvec);
                let diag2 = Aabb::new(q + uvec, q + vvec);
                Aabb::union(diag1, diag2)
            }
            Primitive::Quad { q, u, v } => {
                let diag1 = Aabb::new(q, q + u + v);
                let diag2 = Aabb::new(q + u, q + v);
                Aabb::union(diag1, diag2)
            }
            Primitive::Box { bbox } => bbox,
        }
    }

    pub fn hit(&self, ray: &Ray, bounds: Interval) -> Option<HitRecord> {
        match *self {
            Primitive::Sphere {
                center1,
                motion,
                radius,
            } => Self::hit_sphere(center1, motion, radius, ray, bounds),
            Primitive::AaQuad { q, axis, u, v } => Self::hit_aaquad(q, axis, u, v, ray, bounds),
            Primitive::Quad { q, u, v } => Self::hit_quad(q, u, v, ray, bounds),
            Primitive::Box { bbox } => Self::hit_box(bbox, ray, bounds),
        }
    }

    fn hit_sphere(
        center1: Point3,
        motion: Vec3,
        radius: f64,
        ray: &Ray,
        bounds: Interval,
    ) -> Option<HitRecord> {
        let center = center1 + motion * ray.time;
        let oc = center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - radius * radius;
        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (h - sqrtd) / a;
        if !bounds.surrounds(root) {
            root = (h + sqrtd) / a;
            if !bounds.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - center) / radius;
        let (normal, front_face) = face_normal(ray.direction, outward_normal);

        let theta = (-outward_normal.y).acos();
        let phi = (-outward_normal.z).atan2(outward_normal.x) + std::f64::consts::PI;
        let uv = Uv::new(phi / (2.0 * std::f64::consts::PI), theta / std::f64::consts::PI);

        Some(HitRecord {
            t: root,
            p,
            normal,
            uv,
            front_face,
        })
    }

    fn hit_aaquad(
        q: Point3,
        axis: usize,
        u: f64,
        v: f64,
        ray: &Ray,
        bounds: Interval,
    ) -> Option<HitRecord> {
        if ray.direction[axis].abs() < PARALLEL_EPS {
            return None;
        }
        let t = (q[axis] - ray.origin[axis]) / ray.direction[axis];
        if !bounds.contains(t) {
            return None;
        }

        let intersection = ray.at(t);
        let uaxis = (axis + 1) % 3;
        let vaxis = (axis + 2) % 3;
        let pq = intersection - q;
        let alpha = pq[uaxis] / u;
        let beta = pq[vaxis] / v;
        if !is_interior(alpha, beta) {
            return None;
        }

        let mut outward_normal = Vec3::zero();
        outward_normal[axis] = 1.0;
        let (normal, front_face) = face_normal(ray.direction, outward_normal);

        Some(HitRecord {
            t,
            p: intersection,
            normal,
            uv: Uv::new(alpha, beta),
            front_face,
        })
    }

    fn hit_quad(q: Point3, u: Vec3, v: Vec3, ray: &Ray, bounds: Interval) -> Option<HitRecord> {
        let n = u.cross(v);
        let outward_normal = n.normalized();
        let d = outward_normal.dot(q);
        let denom = outward_normal.dot(ray.direction);
        if denom.abs() < PARALLEL_EPS {
            return None;
        }

        let t = (d - outward_normal.dot(ray.origin)) / denom;
        if !bounds.contains(t) {
            return None;
        }

        let intersection = ray.at(t);
        let pq = intersection - q;
        let v_sq = v.length_squared();
        let u_sq = u.length_squared();
        let dot_uv = u.dot(v);
        let cross_uv_lensq = u_sq * v_sq - dot_uv * dot_uv;
        let dot_uq = u.dot(pq);
        let dot_vq = v.dot(pq);
        let alpha = (dot_uq * v_sq - dot_uv * dot_vq) / cross_uv_lensq;
        let beta = (u_sq * dot_vq - dot_uq * dot_uv) / cross_uv_lensq;
        if !is_interior(alpha, beta) {
            return None;
        }

        let (normal, front_face) = face_normal(ray.direction, outward_normal);

        Some(HitRecord {
            t,
            p: intersection,
            normal,
            uv: Uv::new(alpha, beta),
            front_face,
        })
    }

    fn hit_box(bbox: Aabb, ray: &Ray, bounds: Interval) -> Option<HitRecord> {
        let mut best: Option<HitRecord> = None;
        let mut local_bounds = bounds;

        let axes = [
            (0usize, 2usize, 1usize),
            (1, 0, 2),
            (2, 1, 0),
        ];
        for (axis, u_idx, v_idx) in axes {
            if let Some(rec) = Self::hit_box_side(bbox, axis, u_idx, v_idx, ray, local_bounds) {
                local_bounds.max = rec.t.min(local_bounds.max);
                best = Some(rec);
            }
        }
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn hit_box_side(
        bbox: Aabb,
        axis: usize,
        u_idx: usize,
        v_idx: usize,
        ray: &Ray,
        bounds: Interval,
    ) -> Option<HitRecord> {
        let dir = ray.direction[axis];
        if dir.abs() < PARALLEL_EPS {
            return None;
        }
        let ax = bbox.axis_interval(axis);
        let ax_u = bbox.axis_interval(u_idx);
        let ax_v = bbox.axis_interval(v_idx);

        let (d, normal_dir) = if dir > 0.0 { (ax.min, 1.0) } else { (ax.max, -1.0) };
        let t = (d - ray.origin[axis]) / dir;
        if !bounds.contains(t) {
            return None;
        }

        let intersection = ray.at(t);
        let beta_distance = if normal_dir > 0.0 { ax_v.max } else { ax_v.min };
        let inv_u_mag = 1.0 / ax_u.size();
        let inv_v_mag = 1.0 / ax_v.size();
        let alpha = inv_u_mag * (intersection[u_idx] - ax_u.min);
        let beta = -normal_dir * inv_v_mag * (intersection[v_idx] - beta_distance);
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }

        let mut outward_normal = Vec3::zero();
        outward_normal[axis] = normal_dir;
        let (normal, front_face) = face_normal(ray.direction, outward_normal);

        Some(HitRecord {
            t,
            p: intersection,
            normal,
            uv: Uv::new(alpha, beta),
            front_face,
        })
    }
}

/// Anything the BVH can bound and intersect. Implemented by [`Primitive`]
/// directly and, in [`crate::world`], by a primitive wrapped with its
/// transform stack.
pub trait Hittable {
    fn bounding_box(&self) -> Aabb;
    fn hit(&self, ray: &Ray, bounds: Interval) -> Option<HitRecord>;
}

impl Hittable for Primitive {
    fn bounding_box(&self) -> Aabb {
        Primitive::bounding_box(self)
    }

    fn hit(&self, ray: &Ray, bounds: Interval) -> Option<HitRecord> {
        Primitive::hit(self, ray, bounds)
    }
}

/// A constant-density (isotropic) medium bounded by another primitive.
/// Registered separately from the BVH (§4.H `sampleConstantMediums`), since
/// its "hit" is a stochastic free-path draw rather than a surface crossing.
#[derive(Debug, Clone, Copy)]
pub struct ConstantMedium {
    pub boundary: usize,
    pub neg_inv_density: f64,
    pub color: crate::math::Color,
}

impl ConstantMedium {
    pub fn new(boundary: usize, density: f64, color: crate::math::Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_hits_straight_on_ray() {
        let sphere = Primitive::Sphere {
            center1: Point3::zero(),
            motion: Vec3::zero(),
            radius: 1.0,
        };
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = sphere.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert!(hit.front_face);
    }

    #[test]
    fn aaquad_rejects_point_outside_unit_square() {
        let quad = Primitive::AaQuad {
            q: Point3::zero(),
            axis: 2,
            u: 1.0,
            v: 1.0,
        };
        let ray = Ray::new(Point3::new(5.0, 5.0, -1.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(quad.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn box_bounding_box_matches_corners() {
        let b = Primitive::Box {
            bbox: Aabb::new(Point3::zero(), Point3::ones()),
        };
        assert_eq!(b.bounding_box(), Aabb::new(Point3::zero(), Point3::ones()));
    }

    #[test]
    fn box_hit_reports_front_face_from_outside() {
        let b = Primitive::Box {
            bbox: Aabb::new(Point3::zero(), Point3::ones()),
        };
        let ray = Ray::new(Point3::new(0.5, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let hit = b.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(hit.front_face);
        assert!((hit.t - 5.0).abs() < 1e-9);
    }
}
