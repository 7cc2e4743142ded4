//! # Height Field
//!
//! Per-column terrain height in blocks.
//!
//! ## Pipeline
//!
//! 1. Block → length units (`× block_size`)
//! 2. Domain warp with the biome's warp scale / strength
//! 3. `fbm01` at the biome's base scale, octaves, lacunarity, gain
//! 4. Scale by `terrain_max_height_blocks × height_multiplier`
//! 5. Round, clamp to `[1, chunk_height - 1]`
//!
//! Landmarks then pull columns toward a plateau: exactly the plateau inside
//! `radius - border_width`, a linear ramp across the border, untouched at
//! and beyond the radius. Distances are in length units.
//!
//! Chunk grids for smoothed biomes get box-blur passes. The grid is built
//! with an apron of real samples as wide as the pass count, so a chunk's
//! edge columns see their true neighbours and adjacent chunks agree.

use strata_core::{Biome, BiomeTable, ChunkCoord, WorldConfig};

use crate::landmark::Landmark;
use crate::noise::NoiseSource;

/// Square grid of column heights for one chunk, indexed `[z][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightGrid {
    size: usize,
    heights: Vec<i32>,
}

impl HeightGrid {
    /// Edge length in columns.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Height of column `(x, z)`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, z: usize) -> i32 {
        self.heights[z * self.size + x]
    }

    /// All heights, row-major by z.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.heights
    }
}

/// Terrain height sampler.
#[derive(Clone, Debug)]
pub struct HeightFieldSampler {
    noise: NoiseSource,
    biomes: BiomeTable,
    block_size: f64,
    chunk_size: u32,
    chunk_height: i32,
    max_height_blocks: i32,
    border_width: f64,
}

impl HeightFieldSampler {
    /// Creates a sampler for a world.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            noise: NoiseSource::new(config.seed),
            biomes: config.biomes.clone(),
            block_size: config.block_size,
            chunk_size: config.chunk_size,
            chunk_height: config.chunk_height as i32,
            max_height_blocks: config.terrain_max_height_blocks(),
            border_width: config.landmark_border_width,
        }
    }

    #[inline]
    fn clamp_height(&self, height: f64) -> i32 {
        (height.round() as i32).clamp(1, self.chunk_height - 1)
    }

    /// Terrain height ignoring landmarks.
    #[must_use]
    pub fn raw_height(&self, block_x: i32, block_z: i32, biome: Biome) -> i32 {
        let params = self.biomes.get(biome);

        let x = f64::from(block_x) * self.block_size;
        let z = f64::from(block_z) * self.block_size;
        let (wx, wz) = self.noise.warp(x, z, params.warp_scale, params.warp_strength);

        let h01 = self.noise.fbm01(
            wx / params.base_scale,
            wz / params.base_scale,
            params.octaves,
            params.lacunarity,
            params.gain,
        );

        self.clamp_height(h01 * f64::from(self.max_height_blocks) * params.height_multiplier)
    }

    /// Plateau height of a landmark: the raw height at its centre.
    #[must_use]
    pub fn plateau_height(&self, landmark: &Landmark) -> i32 {
        let (cx, cz) = landmark.center_block(self.chunk_size);
        self.raw_height(cx, cz, landmark.biome)
    }

    /// Column height with landmark flattening applied.
    ///
    /// The first landmark whose footprint contains the column wins.
    #[must_use]
    pub fn height_blocks(
        &self,
        block_x: i32,
        block_z: i32,
        biome: Biome,
        landmarks: &[Landmark],
    ) -> i32 {
        let raw = self.raw_height(block_x, block_z, biome);
        landmarks
            .iter()
            .find_map(|landmark| {
                self.flatten(block_x, block_z, raw, landmark, || self.plateau_height(landmark))
            })
            .unwrap_or(raw)
    }

    /// Blends `raw` toward the landmark plateau, or `None` outside the footprint.
    fn flatten(
        &self,
        block_x: i32,
        block_z: i32,
        raw: i32,
        landmark: &Landmark,
        plateau: impl FnOnce() -> i32,
    ) -> Option<i32> {
        let distance = landmark.distance_blocks(block_x, block_z, self.chunk_size) * self.block_size;
        let outer = f64::from(landmark.radius_blocks(self.chunk_size)) * self.block_size;
        if distance >= outer {
            return None;
        }

        let plateau = plateau();
        let inner = (outer - self.border_width).max(0.0);
        if distance <= inner {
            return Some(plateau);
        }

        let t = (distance - inner) / (outer - inner);
        let plateau = f64::from(plateau);
        Some(self.clamp_height(plateau + (f64::from(raw) - plateau) * t))
    }

    /// Builds the height grid for one chunk, including smoothing.
    #[must_use]
    pub fn height_grid(&self, coord: ChunkCoord, biome: Biome, landmarks: &[Landmark]) -> HeightGrid {
        let params = self.biomes.get(biome);
        let size = self.chunk_size as usize;
        let passes = if params.smoothing_factor > 0.0 {
            params.smoothing_iterations as usize
        } else {
            0
        };

        let padded = size + 2 * passes;
        let origin_x = coord.world_x(self.chunk_size) - passes as i32;
        let origin_z = coord.world_z(self.chunk_size) - passes as i32;

        // Plateaus are sampled once per chunk, not once per column
        let plateaus: Vec<(Landmark, i32)> = landmarks
            .iter()
            .map(|landmark| (*landmark, self.plateau_height(landmark)))
            .collect();

        let mut heights = Vec::with_capacity(padded * padded);
        for z in 0..padded {
            for x in 0..padded {
                let bx = origin_x + x as i32;
                let bz = origin_z + z as i32;
                let raw = self.raw_height(bx, bz, biome);
                let height = plateaus
                    .iter()
                    .find_map(|(landmark, plateau)| self.flatten(bx, bz, raw, landmark, || *plateau))
                    .unwrap_or(raw);
                heights.push(height);
            }
        }

        for _ in 0..passes {
            heights = self.smooth_pass(&heights, padded, params.smoothing_factor);
        }

        let cropped = if passes == 0 {
            heights
        } else {
            let mut cropped = Vec::with_capacity(size * size);
            for z in 0..size {
                let row = (z + passes) * padded + passes;
                cropped.extend_from_slice(&heights[row..row + size]);
            }
            cropped
        };

        HeightGrid {
            size,
            heights: cropped,
        }
    }

    /// One 3×3 box-blur pass, edge-clamped, blended by `factor`.
    fn smooth_pass(&self, source: &[i32], size: usize, factor: f64) -> Vec<i32> {
        let last = size - 1;
        let mut out = Vec::with_capacity(source.len());

        for z in 0..size {
            for x in 0..size {
                let mut sum = 0i64;
                for nz in [z.saturating_sub(1), z, (z + 1).min(last)] {
                    for nx in [x.saturating_sub(1), x, (x + 1).min(last)] {
                        sum += i64::from(source[nz * size + nx]);
                    }
                }
                let average = sum as f64 / 9.0;
                let current = f64::from(source[z * size + x]);
                out.push(self.clamp_height(current + (average - current) * factor));
            }
        }

        out
    }
}
