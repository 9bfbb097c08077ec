//! Deferred attenuation engine.
//!
//! Rather than evaluating a texture the moment a bounce touches it, the
//! tracer records `(kind, uv, point)` into per-kind buffers and this engine
//! evaluates each kind in a tight loop once every sample for a pixel has
//! been drawn. Grouping by kind means noise (compute-bound), image lookups
//! (memory-bound), and solids (free) each get their own loop instead of
//! sharing one megamorphic one.
//!
//! Buffers are laid out contiguously across samples with no gap markers;
//! an RLE-style `(sample_index, count)` list on the side says which run of
//! entries belongs to which sample.

use crate::math::{Color, Point3};
use crate::perlin;
use crate::texture::{Texture, Uv};

#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    solids: usize,
    noises: usize,
    images: usize,
}

pub struct AttenuationEngine {
    solids: Vec<Color>,
    noises: Vec<(f64, Point3)>,
    /// `(texture_index, uv)`, the image itself stays in `World::textures`
    /// rather than being cloned into the queue.
    images: Vec<(usize, Uv)>,

    rle_solids: Vec<(usize, usize)>,
    rle_noises: Vec<(usize, usize)>,
    rle_images: Vec<(usize, usize)>,

    samples: Vec<Color>,
    snapshot: Snapshot,
}

impl AttenuationEngine {
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            solids: Vec::new(),
            noises: Vec::new(),
            images: Vec::new(),
            rle_solids: Vec::new(),
            rle_noises: Vec::new(),
            rle_images: Vec::new(),
            samples: vec![Color::zero(); samples_per_pixel],
            snapshot: Snapshot::default(),
        }
    }

    /// Discards everything recorded for every sample so far, ready for the
    /// next pixel.
    pub fn clear(&mut self) {
        self.solids.clear();
        self.noises.clear();
        self.images.clear();
        self.rle_solids.clear();
        self.rle_noises.clear();
        self.rle_images.clear();
        self.snapshot = Snapshot::default();
    }

    /// Takes a high-water-mark snapshot of the three buffers. `reset` rolls
    /// back to this point, so a path that fails partway through a sample's
    /// bounce loop cannot leak attenuations into the next sample's offset.
    pub fn begin_sample(&mut self) {
        self.snapshot = Snapshot {
            solids: self.solids.len(),
            noises: self.noises.len(),
            images: self.images.len(),
        };
    }

    pub fn emplace_solid(&mut self, color: Color) {
        self.solids.push(color);
    }

    /// Resolves `texture` down to its non-checker leaf at `p` and queues it
    /// by kind. `texture_index` indexes into the world's texture table and
    /// is only used for images, to avoid cloning image data into the queue.
    pub fn emplace(&mut self, texture_index: usize, texture: &Texture, uv: Uv, p: Point3) {
        match texture.resolve_leaf(p) {
            Texture::Solid(c) => self.solids.push(*c),
            Texture::Noise { scale } => self.noises.push((*scale, p)),
            Texture::Image(_) => self.images.push((texture_index, uv)),
            Texture::Checker { .. } => unreachable!("resolve_leaf never returns a checker node"),
        }
    }

    /// Discards every attenuation queued since the last `begin_sample`,
    /// called when a path terminates without reaching a light.
    pub fn reset(&mut self) {
        self.solids.truncate(self.snapshot.solids);
        self.noises.truncate(self.snapshot.noises);
        self.images.truncate(self.snapshot.images);
    }

    /// Commits the current sample: records an RLE run for each kind that
    /// has entries since the last snapshot (none if `reset` already rolled
    /// them back), and stores `terminal_color` for the sample.
    pub fn finish_sample(&mut self, sample_index: usize, terminal_color: Color) {
        let solids_count = self.solids.len() - self.snapshot.solids;
        let noises_count = self.noises.len() - self.snapshot.noises;
        let images_count = self.images.len() - self.snapshot.images;

        if solids_count > 0 {
            self.rle_solids.push((sample_index, solids_count));
        }
        if noises_count > 0 {
            self.rle_noises.push((sample_index, noises_count));
        }
        if images_count > 0 {
            self.rle_images.push((sample_index, images_count));
        }

        self.samples[sample_index] = terminal_color;
    }

    /// Evaluates every queued attenuation by kind, folds each RLE run's
    /// product into its sample, and returns the pixel color averaged over
    /// all samples.
    pub fn resolve_pixel(&mut self, textures: &[Texture]) -> Color {
        let mut start = 0;
        for &(sample, count) in &self.rle_noises {
            let mut res = self.samples[sample];
            for &(scale, p) in &self.noises[start..start + count] {
                let turb = perlin::shared().turbulence(p, 7);
                res *= 0.5 * (1.0 + (scale * p.z + 10.0 * turb).sin());
            }
            start += count;
            self.samples[sample] = res;
        }

        let mut start = 0;
        for &(sample, count) in &self.rle_images {
            let mut res = self.samples[sample];
            for &(texture_index, uv) in &self.images[start..start + count] {
                if let Texture::Image(img) = &textures[texture_index] {
                    res = res.hadamard(img.sample(uv));
                }
            }
            start += count;
            self.samples[sample] = res;
        }

        let mut start = 0;
        for &(sample, count) in &self.rle_solids {
            let mut res = self.samples[sample];
            for &color in &self.solids[start..start + count] {
                res = res.hadamard(color);
            }
            start += count;
            self.samples[sample] = res;
        }

        let sum = self.samples.iter().fold(Color::zero(), |acc, &c| acc + c);
        sum / self.samples.len() as f64
    }
}
