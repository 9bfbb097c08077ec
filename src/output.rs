//! Tone mapping and image output.
//!
//! Gamma-2 tone mapping (`sqrt`) plus a clamp to `[0, 0.999]` before byte
//! packing, so a pixel exactly at 1.0 doesn't round up into the next byte.

use crate::error::RenderError;
use crate::math::{Color, Interval};

const INTENSITY: Interval = Interval::new(0.0, 0.999);

fn linear_to_gamma(x: f64) -> f64 {
    if x > 0.0 {
        x.sqrt()
    } else {
        0.0
    }
}

fn to_bytes(pixels: &[Color]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for color in pixels {
        let r = linear_to_gamma(color.x);
        let g = linear_to_gamma(color.y);
        let b = linear_to_gamma(color.z);
        bytes.push((256.0 * INTENSITY.clamp(r)) as u8);
        bytes.push((256.0 * INTENSITY.clamp(g)) as u8);
        bytes.push((256.0 * INTENSITY.clamp(b)) as u8);
    }
    bytes
}

/// Tone-maps a row-major pixel buffer and writes it to `path` as a PNG.
pub fn write_png(path: &str, width: u32, height: u32, pixels: &[Color]) -> Result<(), RenderError> {
    debug_assert_eq!(pixels.len(), (width * height) as usize);
    let bytes = to_bytes(pixels);

    image::save_buffer(path, &bytes, width, height, image::ColorType::Rgb8).map_err(|source| RenderError::OutputWrite {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_to_gamma_round_trips_for_unit_values() {
        let value = 0.64_f64;
        let gamma = linear_to_gamma(value);
        assert!((gamma * gamma - value).abs() < 1e-12);
    }

    #[test]
    fn negative_linear_values_map_to_zero() {
        assert_eq!(linear_to_gamma(-1.0), 0.0);
    }

    #[test]
    fn white_clamps_to_255_not_256() {
        let bytes = to_bytes(&[Color::ones()]);
        assert_eq!(bytes, vec![255, 255, 255]);
    }

    #[test]
    fn black_maps_to_zero_bytes() {
        let bytes = to_bytes(&[Color::zero()]);
        assert_eq!(bytes, vec![0, 0, 0]);
    }
}
