//! # Terrain
//!
//! Heightmap sampling and splat-map painting. Heights come from Perlin
//! noise over world coordinates; the splat alphamap stores per-pixel layer
//! weights the renderer blends ground textures with. The path router paints
//! walkways by stamping circles of the path layer along each route.

use crate::map::grid::WorldPos;
use noise::{NoiseFn, Perlin};

/// Terrain state for one generated map: noise-driven heights plus a splat
/// alphamap of `layers` weights per pixel.
pub struct Terrain {
    perlin: Perlin,
    /// Alphamap weights, `resolution * resolution * layers` values in
    /// row-major pixel order.
    alphamap: Vec<f32>,
    /// Alphamap edge resolution in pixels.
    pub resolution: usize,
    /// Number of splat layers.
    pub layers: usize,
    /// World width the alphamap spans.
    world_width: f32,
    /// World length the alphamap spans.
    world_length: f32,
    /// World-space center of the terrain.
    origin: WorldPos,
    /// Height amplitude applied to the noise sample.
    amplitude: f32,
    /// Noise frequency in cycles per world unit.
    frequency: f64,
}

impl Terrain {
    /// Creates terrain covering a world rectangle, with the alphamap
    /// cleared to the base layer.
    pub fn new(
        seed: u32,
        world_width: f32,
        world_length: f32,
        origin: WorldPos,
        amplitude: f32,
    ) -> Self {
        let resolution = crate::config::ALPHAMAP_RESOLUTION;
        let layers = crate::config::ALPHAMAP_LAYERS;
        let mut terrain = Self {
            perlin: Perlin::new(seed),
            alphamap: vec![0.0; resolution * resolution * layers],
            resolution,
            layers,
            world_width,
            world_length,
            origin,
            amplitude,
            frequency: 0.02,
        };
        terrain.clear_to_base();
        terrain
    }

    /// Height of the ground at a world position.
    pub fn sample_height(&self, pos: WorldPos) -> f32 {
        let noise = self
            .perlin
            .get([pos.x as f64 * self.frequency, pos.z as f64 * self.frequency]);
        noise as f32 * self.amplitude
    }

    /// Resets the alphamap so layer 0 fully covers every pixel.
    pub fn clear_to_base(&mut self) {
        for pixel in self.alphamap.chunks_mut(self.layers) {
            pixel[0] = 1.0;
            for weight in &mut pixel[1..] {
                *weight = 0.0;
            }
        }
    }

    /// Alphamap pixel coordinates of a world position, unclamped.
    fn pixel_of(&self, pos: WorldPos) -> (i64, i64) {
        let u = (pos.x - self.origin.x + self.world_width / 2.0) / self.world_width;
        let v = (pos.z - self.origin.z + self.world_length / 2.0) / self.world_length;
        (
            (u * self.resolution as f32).floor() as i64,
            (v * self.resolution as f32).floor() as i64,
        )
    }

    /// Stamps a filled circle of a single layer onto the alphamap.
    ///
    /// Every pixel inside the circle is replaced outright: the chosen layer
    /// gets weight 1 and the others 0, so overlapping stamps stay uniform
    /// instead of accumulating.
    pub fn paint_circle(&mut self, center: WorldPos, radius: f32, layer: usize) {
        let (cx, cz) = self.pixel_of(center);
        // The ceiled radius only bounds the loop; the inside test keeps the
        // fractional pixel radius so the brush never grows a pixel fatter.
        let rad = radius / self.world_width * self.resolution as f32;
        let r = rad.ceil() as i64;

        for pz in (cz - r)..=(cz + r) {
            for px in (cx - r)..=(cx + r) {
                if px < 0 || pz < 0 || px >= self.resolution as i64 || pz >= self.resolution as i64
                {
                    continue;
                }
                let dx = (px - cx) as f32;
                let dz = (pz - cz) as f32;
                if dx * dx + dz * dz > rad * rad {
                    continue;
                }
                let base = (pz as usize * self.resolution + px as usize) * self.layers;
                for l in 0..self.layers {
                    self.alphamap[base + l] = if l == layer { 1.0 } else { 0.0 };
                }
            }
        }
    }

    /// Paints a stroke of circles from `from` to `to`, spaced at half the
    /// radius so consecutive stamps overlap into a continuous band.
    pub fn paint_stroke(&mut self, from: WorldPos, to: WorldPos, radius: f32, layer: usize) {
        let distance = from.distance(to);
        let steps = (distance / (radius * 0.5)).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.paint_circle(from.lerp(to, t), radius, layer);
        }
    }

    /// Layer weights at a world position, or `None` outside the terrain.
    pub fn layer_weights(&self, pos: WorldPos) -> Option<&[f32]> {
        let (px, pz) = self.pixel_of(pos);
        if px < 0 || pz < 0 || px >= self.resolution as i64 || pz >= self.resolution as i64 {
            return None;
        }
        let base = (pz as usize * self.resolution + px as usize) * self.layers;
        Some(&self.alphamap[base..base + self.layers])
    }
}
