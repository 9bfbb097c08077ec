use rand::Rng;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub};

/// A 3-component vector used for positions, directions, and colors in the path tracer.
///
/// This type implements all standard arithmetic operations with operator overloading,
/// and provides geometric utilities (dot product, cross product, reflection, refraction)
/// needed for physically-based light transport simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Squared Euclidean length, avoids the sqrt for performance-critical paths
    /// such as BVH traversal and intersection culling.
    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector. Panics on zero-length vectors in debug mode.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "Attempted to normalize a zero-length vector");
        self / len
    }

    /// The standard Euclidean inner product.
    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product, used for constructing orthonormal camera bases.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about the surface normal `n`.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's law refraction for a unit incoming vector. `eta_ratio` is the ratio
    /// of the incident over the transmitted index of refraction. Total internal
    /// reflection is handled by the caller via Schlick reflectance, matching the
    /// dielectric scatter contract, this always returns a (possibly complex-valued
    /// in magnitude) transmitted direction.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Self {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_out_perp = (self + normal * cos_theta) * eta_ratio;
        let r_out_parallel = normal * -((1.0 - r_out_perp.length_squared()).abs().sqrt());
        r_out_perp + r_out_parallel
    }

    /// Component-wise (Hadamard) product, color modulation where each channel
    /// is attenuated independently by the surface albedo.
    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Component-wise linear interpolation: self·(1-t) + other·t
    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Clamps each component to [0, 1].
    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    /// Checks if the vector is near-zero in all components, used to avoid
    /// degenerate scatter directions that would produce NaN in subsequent math.
    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    /// Generates a uniformly distributed random point inside the unit sphere
    /// via rejection sampling. Used for Lambertian diffuse scattering.
    pub fn random_in_unit_sphere(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    /// Generates a random unit vector via rejection sampling on the unit sphere.
    pub fn random_unit_vector(rng: &mut dyn rand::RngCore) -> Self {
        Self::random_in_unit_sphere(rng).normalized()
    }

    /// Random point on the unit disk, used for depth-of-field simulation
    /// by jittering the camera ray origin across the lens aperture.
    pub fn random_in_unit_disk(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let v = Self::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray R(t) = origin + t · direction, carrying a `time` sample in
/// `[0,1)` used to resolve motion blur (moving spheres, the `Move` transform).
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
    pub time: f64,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vec3, time: f64) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Evaluates the ray at parameter t. Positive t gives points ahead of the origin.
    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Interval ───────────────────────────────────────────────────────────────

/// An inclusive range `[min, max]`, used for ray parameter bounds and texture
/// coordinate clamping. Empty when `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval::new(f64::INFINITY, f64::NEG_INFINITY);
    pub const UNIVERSE: Interval = Interval::new(f64::NEG_INFINITY, f64::INFINITY);
    pub const UNIT: Interval = Interval::new(0.0, 1.0);

    #[inline(always)]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn size(self) -> f64 {
        self.max - self.min
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.min > self.max
    }

    #[inline(always)]
    pub fn contains(self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    #[inline(always)]
    pub fn surrounds(self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    #[inline(always)]
    pub fn clamp(self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    #[inline(always)]
    pub fn mid_point(self) -> f64 {
        0.5 * (self.min + self.max)
    }

    pub fn union(a: Interval, b: Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_empty_identity() {
        let b = Interval::new(1.0, 4.0);
        assert_eq!(Interval::union(Interval::EMPTY, b), b);
    }

    #[test]
    fn refract_matches_incoming_at_normal_incidence_unit_ratio() {
        let incoming = Vec3::new(0.0, -1.0, 0.0);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let refracted = incoming.refract(normal, 1.0);
        assert!((refracted - incoming).length() < 1e-9);
    }

    #[test]
    fn near_zero_detects_small_components() {
        assert!(Vec3::new(1e-9, -1e-9, 0.0).near_zero());
        assert!(!Vec3::new(1e-3, 0.0, 0.0).near_zero());
    }

    #[test]
    fn vec3_index_and_index_mut_agree() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v[1] = 9.0;
        assert_eq!(v.y, 9.0);
        assert_eq!(v[1], 9.0);
    }
}
