//! Perlin noise and turbulence, used by the noise texture.
//!
//! The permutation tables are generated once and shared by every thread: the
//! C++ predecessor of this renderer built a fresh table per noise texture
//! instance, but nothing about the tables is per-instance, so this renderer
//! builds exactly one, behind a [`std::sync::OnceLock`], the first time any
//! noise texture is sampled.

use std::sync::OnceLock;

use crate::math::{Point3, Vec3};
use crate::rng::Lcg32;

const POINT_COUNT: usize = 256;

/// Fixed seed: noise appearance is part of a scene's visual identity and
/// should not depend on which thread happens to initialize it first.
const TABLE_SEED: u32 = 0x5EED_F00D;

pub struct Perlin {
    randvec: Vec<Vec3>,
    perm_x: Vec<i32>,
    perm_y: Vec<i32>,
    perm_z: Vec<i32>,
}

static SHARED: OnceLock<Perlin> = OnceLock::new();

/// Returns the single process-wide Perlin table, building it on first use.
pub fn shared() -> &'static Perlin {
    SHARED.get_or_init(Perlin::build)
}

impl Perlin {
    fn build() -> Self {
        let mut rng = Lcg32::new(TABLE_SEED);
        let randvec = (0..POINT_COUNT)
            .map(|_| Vec3::random_in_unit_sphere(&mut rng).normalized())
            .collect();

        Self {
            randvec,
            perm_x: Self::generate_perm(&mut rng),
            perm_y: Self::generate_perm(&mut rng),
            perm_z: Self::generate_perm(&mut rng),
        }
    }

    fn generate_perm(rng: &mut Lcg32) -> Vec<i32> {
        use rand::Rng;
        let mut p: Vec<i32> = (0..POINT_COUNT as i32).collect();
        for i in (1..POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            p.swap(i, target);
        }
        p
    }

    /// Smoothed (Hermite-interpolated, trilinear) noise value at `p`, in
    /// roughly `[-1, 1]`.
    pub fn noise(&self, p: Point3) -> f64 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i32;
        let j = p.y.floor() as i32;
        let k = p.z.floor() as i32;

        let mut c = [[[Vec3::zero(); 2]; 2]; 2];
        for (di, row) in c.iter_mut().enumerate() {
            for (dj, col) in row.iter_mut().enumerate() {
                for (dk, cell) in col.iter_mut().enumerate() {
                    let idx = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *cell = self.randvec[idx as usize];
                }
            }
        }

        Self::trilinear_interp(c, u, v, w)
    }

    fn trilinear_interp(c: [[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);
        let mut accum = 0.0;
        for (i, row) in c.iter().enumerate() {
            for (j, col) in row.iter().enumerate() {
                for (k, cell) in col.iter().enumerate() {
                    let weight = Vec3::new(u - i as f64, v - j as f64, w - k as f64);
                    let fi = i as f64;
                    let fj = j as f64;
                    let fk = k as f64;
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * cell.dot(weight);
                }
            }
        }
        accum
    }

    /// Turbulence: sum of `noise` at successively doubled frequency and
    /// halved amplitude, `depth` octaves deep.
    pub fn turbulence(&self, p: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p = temp_p * 2.0;
        }

        accum.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_table_is_stable_across_calls() {
        let a = shared().noise(Point3::new(1.0, 2.0, 3.0));
        let b = shared().noise(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(a, b);
    }

    #[test]
    fn noise_stays_in_reasonable_bounds() {
        let p = shared();
        for i in 0..50 {
            let v = p.noise(Point3::new(i as f64 * 0.37, -i as f64 * 0.11, i as f64 * 0.91));
            assert!(v.abs() <= 1.2);
        }
    }

    #[test]
    fn turbulence_is_nonnegative() {
        let p = shared();
        let t = p.turbulence(Point3::new(0.3, 0.8, -1.2), 7);
        assert!(t >= 0.0);
    }
}
