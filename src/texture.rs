//! Texture tree: solid colors, checker volumes, Perlin noise, and images.
//!
//! A `Texture` is a small tagged tree rather than a trait object, `Checker`
//! owns two child textures and recurses into them directly, matching the
//! original's `texture::value` switch instead of going through dynamic
//! dispatch for every leaf.

use std::env;
use std::path::PathBuf;

use crate::error::RenderError;
use crate::math::{Color, Interval, Point3};
use crate::perlin;

/// Surface parameterization coordinates, produced by a primitive's hit
/// computation and consumed by texture sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    Checker {
        inv_scale: f64,
        even: Box<Texture>,
        odd: Box<Texture>,
    },
    Noise {
        scale: f64,
    },
    Image(Image),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(scale: f64, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Box::new(even),
            odd: Box::new(odd),
        }
    }

    pub fn noise(scale: f64) -> Self {
        Texture::Noise { scale }
    }

    pub fn image(filename: &str) -> Self {
        Texture::Image(Image::load(filename))
    }

    /// Walks down through `Checker` nodes at `p` until reaching a non-checker
    /// leaf. Used by the deferred attenuation engine to classify a texture
    /// sample by kind before queuing it, matches `value`'s checker branch
    /// but stops short of evaluating the leaf itself.
    pub fn resolve_leaf(&self, p: Point3) -> &Texture {
        match self {
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let xi = (inv_scale * p.x).floor() as i64;
                let yi = (inv_scale * p.y).floor() as i64;
                let zi = (inv_scale * p.z).floor() as i64;
                if (xi + yi + zi).rem_euclid(2) == 0 {
                    even.resolve_leaf(p)
                } else {
                    odd.resolve_leaf(p)
                }
            }
            leaf => leaf,
        }
    }

    pub fn value(&self, uv: Uv, p: Point3) -> Color {
        match self {
            Texture::Solid(c) => *c,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let xi = (inv_scale * p.x).floor() as i64;
                let yi = (inv_scale * p.y).floor() as i64;
                let zi = (inv_scale * p.z).floor() as i64;
                if (xi + yi + zi).rem_euclid(2) == 0 {
                    even.value(uv, p)
                } else {
                    odd.value(uv, p)
                }
            }
            Texture::Noise { scale } => {
                let turb = perlin::shared().turbulence(p, 7);
                Color::new(0.5, 0.5, 0.5) * (1.0 + (scale * p.z + 10.0 * turb).sin())
            }
            Texture::Image(img) => img.sample(uv),
        }
    }
}

/// A loaded (or missing) linear-float RGB image, sampled with
/// nearest-neighbor and clamped texture coordinates.
#[derive(Debug, Clone)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

const SEARCH_DEPTH: usize = 6;

impl Image {
    /// Searches `RTW_IMAGES/<filename>`, then `<filename>`, then
    /// `images/<filename>` ascending through up to six parent directories.
    /// A missing or unreadable file yields a zero-sized image that samples
    /// as magenta everywhere, rather than a hard error, scenes commonly
    /// reference optional texture assets.
    pub fn load(filename: &str) -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(dir) = env::var("RTW_IMAGES") {
            candidates.push(PathBuf::from(dir).join(filename));
        }
        candidates.push(PathBuf::from(filename));
        let mut prefix = PathBuf::from("images");
        for _ in 0..=SEARCH_DEPTH {
            candidates.push(prefix.join(filename));
            prefix = PathBuf::from("..").join(prefix);
        }

        for path in &candidates {
            if let Ok(img) = image::open(path) {
                let rgb = img.to_rgb32f();
                let (w, h) = (rgb.width() as usize, rgb.height() as usize);
                let data: Vec<f32> = rgb.into_raw();
                return Self {
                    width: w,
                    height: h,
                    data,
                };
            }
        }

        tracing::warn!(filename, "could not load image texture; sampling as magenta");
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn try_load(filename: &str) -> Result<Self, RenderError> {
        let img = Self::load(filename);
        if img.width == 0 {
            return Err(RenderError::TextureLoad {
                path: filename.to_string(),
            });
        }
        Ok(img)
    }

    fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        if self.width == 0 || self.height == 0 {
            return [1.0, 0.0, 1.0];
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub(crate) fn sample(&self, uv: Uv) -> Color {
        let u = Interval::UNIT.clamp(uv.u);
        let v = Interval::UNIT.clamp(uv.v);
        let i = (u * self.width as f64) as usize;
        let j = ((1.0 - v) * self.height as f64) as usize;
        let [r, g, b] = self.pixel(i, j);
        Color::new(r as f64, g as f64, b as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_texture_ignores_position() {
        let t = Texture::solid(Color::new(0.2, 0.4, 0.6));
        let a = t.value(Uv::new(0.0, 0.0), Point3::zero());
        let b = t.value(Uv::new(1.0, 1.0), Point3::new(9.0, 9.0, 9.0));
        assert_eq!(a, b);
    }

    #[test]
    fn checker_alternates_across_unit_cells() {
        let t = Texture::checker(1.0, Texture::solid(Color::ones()), Texture::solid(Color::zero()));
        let even = t.value(Uv::new(0.0, 0.0), Point3::new(0.5, 0.5, 0.5));
        let odd = t.value(Uv::new(0.0, 0.0), Point3::new(1.5, 0.5, 0.5));
        assert_eq!(even, Color::ones());
        assert_eq!(odd, Color::zero());
    }

    #[test]
    fn missing_image_samples_as_magenta() {
        let img = Image::load("definitely-does-not-exist-anywhere.png");
        let c = img.sample(Uv::new(0.3, 0.7));
        assert_eq!(c, Color::new(1.0, 0.0, 1.0));
    }
}
