//! Thin-lens camera: basis derivation, pixel grid, and per-sample ray
//! generation with depth-of-field and motion-blur time sampling.

use rand::Rng;

use crate::math::{Point3, Ray, Vec3};

pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    pub vfov_degrees: f64,
    pub aspect_ratio: f64,
    pub image_width: u32,
    pub defocus_angle: f64,
    pub focus_dist: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 16.0 / 9.0,
            image_width: 800,
            defocus_angle: 0.0,
            focus_dist: 3.0,
        }
    }
}

pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_angle: f64,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let image_height = ((config.image_width as f64 / config.aspect_ratio) as u32).max(1);

        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (config.image_width as f64 / image_height as f64);

        let w = (config.look_from - config.look_at).normalized();
        let u = config.vup.cross(w).normalized();
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;

        let pixel_delta_u = viewport_u / config.image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left =
            config.look_from - w * config.focus_dist - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + (pixel_delta_u + pixel_delta_v) * 0.5;

        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        Self {
            image_width: config.image_width,
            image_height,
            center: config.look_from,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_angle: config.defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    fn defocus_disk_sample(&self, rng: &mut dyn rand::RngCore) -> Point3 {
        let p = Vec3::random_in_unit_disk(rng);
        self.center + self.defocus_disk_u * p.x + self.defocus_disk_v * p.y
    }

    /// Constructs a randomly jittered, time-sampled ray through pixel
    /// `(i, j)`, originating from the defocus disk when the lens has a
    /// nonzero aperture.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn rand::RngCore) -> Ray {
        let offset = Vec3::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5, 0.0);
        let pixel_sample = self.pixel00_loc
            + self.pixel_delta_u * (i as f64 + offset.x)
            + self.pixel_delta_v * (j as f64 + offset.y);

        let origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };
        let direction = pixel_sample - origin;
        let time = rng.gen::<f64>();

        Ray::new(origin, direction, time)
    }
}
