//! Transform stack applied to primitives prior to intersection.
//!
//! A primitive can carry an ordered list of transforms. They are applied to
//! the incoming ray left-to-right before the primitive's own `hit`, and
//! their reverses are applied to the resulting hit record right-to-left.
//! A bounding box has no ray to invert, so it is lifted into world space by
//! folding the forward maps right-to-left too, matching the hit record's
//! composition order rather than the ray's.

use crate::aabb::Aabb;
use crate::math::{Ray, Vec3};
use crate::primitive::HitRecord;

#[derive(Debug, Clone, Copy)]
pub enum Transform {
    Translate(Vec3),
    RotateY { sin_theta: f64, cos_theta: f64 },
    Move(Vec3),
}

impl Transform {
    pub fn rotate_y(degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Transform::RotateY {
            sin_theta: radians.sin(),
            cos_theta: radians.cos(),
        }
    }

    /// Maps a world-space ray into the primitive's local space.
    fn apply(&self, ray: Ray) -> Ray {
        match *self {
            Transform::Translate(offset) => Ray::new(ray.origin - offset, ray.direction, ray.time),
            Transform::RotateY { sin_theta, cos_theta } => {
                let rotate = |v: Vec3| {
                    Vec3::new(
                        cos_theta * v.x - sin_theta * v.z,
                        v.y,
                        sin_theta * v.x + cos_theta * v.z,
                    )
                };
                Ray::new(rotate(ray.origin), rotate(ray.direction), ray.time)
            }
            Transform::Move(segment) => {
                Ray::new(ray.origin - segment * ray.time, ray.direction, ray.time)
            }
        }
    }

    /// Maps a local-space hit record back into world space.
    fn apply_reverse(&self, time: f64, rec: &mut HitRecord) {
        match *self {
            Transform::Translate(offset) => rec.p += offset,
            Transform::RotateY { sin_theta, cos_theta } => {
                let unrotate = |v: Vec3| {
                    Vec3::new(
                        cos_theta * v.x + sin_theta * v.z,
                        v.y,
                        -sin_theta * v.x + cos_theta * v.z,
                    )
                };
                rec.p = unrotate(rec.p);
                rec.normal = unrotate(rec.normal);
            }
            Transform::Move(segment) => rec.p += segment * time,
        }
    }

    fn apply_to_bbox(&self, bbox: Aabb) -> Aabb {
        match *self {
            Transform::Translate(offset) => Aabb::new(bbox.min + offset, bbox.max + offset),
            Transform::RotateY { sin_theta, cos_theta } => {
                let mut min = Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
                let mut max = Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
                for i in 0..2 {
                    for j in 0..2 {
                        for k in 0..2 {
                            let x = if i == 1 { bbox.max.x } else { bbox.min.x };
                            let y = if j == 1 { bbox.max.y } else { bbox.min.y };
                            let z = if k == 1 { bbox.max.z } else { bbox.min.z };
                            let new_x = cos_theta * x + sin_theta * z;
                            let new_z = -sin_theta * x + cos_theta * z;
                            let tester = Vec3::new(new_x, y, new_z);
                            for axis in 0..3 {
                                min[axis] = min[axis].min(tester[axis]);
                                max[axis] = max[axis].max(tester[axis]);
                            }
                        }
                    }
                }
                Aabb::new(min, max)
            }
            Transform::Move(segment) => {
                Aabb::union(bbox, Aabb::new(bbox.min + segment, bbox.max + segment))
            }
        }
    }
}

/// Applies an ordered list of transforms to a ray, forward.
pub fn apply_all(transforms: &[Transform], ray: Ray) -> Ray {
    transforms.iter().fold(ray, |r, t| t.apply(r))
}

/// Applies the reverses of an ordered list of transforms to a hit record,
/// in reverse order.
pub fn apply_all_reverse(transforms: &[Transform], time: f64, rec: &mut HitRecord) {
    for t in transforms.iter().rev() {
        t.apply_reverse(time, rec);
    }
}

/// Lifts a local-space bounding box into world space through an ordered
/// transform list. `apply_all` maps a ray world-to-local by folding each
/// transform's inverse left-to-right; `apply_all_reverse` maps the hit
/// record back by folding each transform's forward map right-to-left. The
/// bbox has no ray to invert, so it must compose its forward maps the same
/// right-to-left way `apply_all_reverse` does, not left-to-right.
pub fn apply_all_to_bbox(transforms: &[Transform], bbox: Aabb) -> Aabb {
    transforms.iter().rev().fold(bbox, |b, t| t.apply_to_bbox(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Interval, Point3};
    use crate::primitive::Primitive;

    #[test]
    fn rotate_then_translate_round_trips_hit_point() {
        let transforms = vec![Transform::Translate(Vec3::new(2.0, 0.0, 0.0)), Transform::rotate_y(45.0)];
        let sphere = Primitive::Sphere {
            center1: Point3::zero(),
            motion: Vec3::zero(),
            radius: 1.0,
        };

        let world_ray = Ray::new(Point3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let local_ray = apply_all(&transforms, world_ray);
        let mut rec = sphere.hit(&local_ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        let t = rec.t;
        apply_all_reverse(&transforms, world_ray.time, &mut rec);
        // These transforms are isometries applied consistently to both the ray
        // and the hit record, so the ray parameter t is preserved and the
        // reverse-transformed point must land back on the original world ray.
        assert!((rec.p - world_ray.at(t)).length() < 1e-6);
    }

    #[test]
    fn translate_bbox_shifts_by_offset() {
        let bbox = Aabb::new(Point3::zero(), Point3::ones());
        let transforms = vec![Transform::Translate(Vec3::new(2.0, 0.0, 0.0))];
        let lifted = apply_all_to_bbox(&transforms, bbox);
        assert_eq!(lifted, Aabb::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)));
    }

    #[test]
    fn rotate_y_then_translate_bbox_matches_expected_box() {
        // Box (0,0,0)-(1,1,1), transforms = [rotate_y(45deg), translate(2,0,0)].
        // A ray maps world-to-local as translate.apply(rotate.apply(ray)), so
        // the hit record (and the bbox) must compose forward maps in the
        // opposite order: translate the box first, then rotate the result,
        // i.e. rotate_fwd(translate_fwd(box)), not translate_fwd(rotate_fwd(box)).
        let bbox = Aabb::new(Point3::zero(), Point3::ones());
        let transforms = vec![Transform::rotate_y(45.0), Transform::Translate(Vec3::new(2.0, 0.0, 0.0))];
        let lifted = apply_all_to_bbox(&transforms, bbox);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!((lifted.min.x - 2.0 * half).abs() < 1e-6);
        assert!((lifted.max.x - 4.0 * half).abs() < 1e-6);
        assert!((lifted.min.z - (-3.0 * half)).abs() < 1e-6);
        assert!((lifted.max.z - (-half)).abs() < 1e-6);
        assert!((lifted.min.y - 0.0).abs() < 1e-6);
        assert!((lifted.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bbox_encloses_every_point_the_transformed_primitive_actually_hits_at() {
        // A Cornell-box-style wrapped box: rotate_y then translate, matching
        // scenes.rs's tall box. Every corner of the local box must map, via
        // the same per-transform forward maps apply_all_reverse uses on a
        // real hit record, into the lifted world-space bbox, or the BVH
        // would prune a ray that actually hits the primitive.
        let transforms = vec![Transform::rotate_y(15.0), Transform::Translate(Vec3::new(265.0, 0.0, 295.0))];
        let local_bbox = Aabb::new(Point3::zero(), Point3::new(165.0, 330.0, 165.0));
        let lifted = apply_all_to_bbox(&transforms, local_bbox);

        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let local_p = Point3::new(
                        if i == 0 { local_bbox.min.x } else { local_bbox.max.x },
                        if j == 0 { local_bbox.min.y } else { local_bbox.max.y },
                        if k == 0 { local_bbox.min.z } else { local_bbox.max.z },
                    );
                    let mut rec = HitRecord {
                        t: 0.0,
                        p: local_p,
                        normal: Vec3::unit_y(),
                        uv: crate::texture::Uv::new(0.0, 0.0),
                        front_face: true,
                    };
                    apply_all_reverse(&transforms, 0.0, &mut rec);

                    assert!(lifted.min.x - 1e-6 <= rec.p.x && rec.p.x <= lifted.max.x + 1e-6);
                    assert!(lifted.min.y - 1e-6 <= rec.p.y && rec.p.y <= lifted.max.y + 1e-6);
                    assert!(lifted.min.z - 1e-6 <= rec.p.z && rec.p.z <= lifted.max.z + 1e-6);
                }
            }
        }
    }
}
