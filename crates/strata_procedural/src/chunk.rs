//! # Chunk Generator
//!
//! Fills a [`VoxelBuffer`] from a chunk's height grid.
//!
//! ## Column Composition
//!
//! For a column of height `h`, bottom-up:
//!
//! ```text
//! y >= h          Air
//! y == h-1        top block (Grass, or the biome's override)
//! h-5 ..= h-2     Dirt
//! y <  h-5        Stone
//! ```
//!
//! Biomes change only the height field and the single top block; the
//! layering is the same everywhere.

use strata_core::{Biome, BiomeTable, BlockType, ChunkCoord, VoxelBuffer, WorldConfig};

use crate::height::HeightFieldSampler;
use crate::landmark::Landmark;

/// Dirt layers under the top block.
pub const DIRT_LAYERS: i32 = 4;

/// Deterministic chunk generator.
///
/// Owns its [`HeightFieldSampler`]; `generate` takes `&self` and touches no
/// shared state, so one generator can serve every worker thread.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    sampler: HeightFieldSampler,
    biomes: BiomeTable,
    chunk_size: usize,
    chunk_height: usize,
    block_size: f64,
}

impl ChunkGenerator {
    /// Creates a generator for a world.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            sampler: HeightFieldSampler::new(config),
            biomes: config.biomes.clone(),
            chunk_size: config.chunk_size as usize,
            chunk_height: config.chunk_height as usize,
            block_size: config.block_size,
        }
    }

    /// The height sampler.
    #[inline]
    #[must_use]
    pub const fn sampler(&self) -> &HeightFieldSampler {
        &self.sampler
    }

    /// Generates one chunk.
    ///
    /// `landmarks` must already be materialized for the chunk's 3×3 region
    /// neighbourhood, in region order.
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord, biome: Biome, landmarks: &[Landmark]) -> VoxelBuffer {
        let grid = self.sampler.height_grid(coord, biome, landmarks);
        let rule = self.biomes.get(biome).top_block;
        let mut voxels = VoxelBuffer::new(self.chunk_size, self.chunk_height);

        for z in 0..self.chunk_size {
            for x in 0..self.chunk_size {
                let height = grid.get(x, z);
                let top = rule.resolve(height - 1, self.block_size);
                Self::fill_column(&mut voxels, x, z, height, top);
            }
        }

        tracing::trace!(
            "Generated chunk ({}, {}) as {}: {} solid voxels",
            coord.x,
            coord.z,
            biome.name(),
            voxels.solid_count()
        );

        voxels
    }

    /// Writes one column of height `height` with the given top block.
    fn fill_column(voxels: &mut VoxelBuffer, x: usize, z: usize, height: i32, top: BlockType) {
        let top_y = height - 1;
        for y in 0..height {
            let block = if y == top_y {
                top
            } else if y >= top_y - DIRT_LAYERS {
                BlockType::Dirt
            } else {
                BlockType::Stone
            };
            voxels.set(x, y as usize, z, block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(voxels: &VoxelBuffer, x: usize, z: usize) -> Vec<BlockType> {
        (0..voxels.height()).map(|y| voxels.get(x, y, z)).collect()
    }

    #[test]
    fn test_generation_is_byte_identical() {
        let config = WorldConfig::test();
        let a = ChunkGenerator::new(&config);
        let b = ChunkGenerator::new(&config);

        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 5)] {
            let va = a.generate(coord, Biome::Hills, &[]);
            let vb = b.generate(coord, Biome::Hills, &[]);
            assert_eq!(va.as_bytes(), vb.as_bytes());
        }
    }

    #[test]
    fn test_column_composition() {
        let generator = ChunkGenerator::new(&WorldConfig::test());
        let coord = ChunkCoord::new(1, 2);
        let voxels = generator.generate(coord, Biome::Forest, &[]);

        for z in 0..16 {
            for x in 0..16 {
                let h = generator.sampler().height_blocks(
                    coord.world_x(16) + x as i32,
                    coord.world_z(16) + z as i32,
                    Biome::Forest,
                    &[],
                ) as usize;
                let col = column(&voxels, x, z);

                assert_eq!(col[h - 1], BlockType::Grass);
                for (y, block) in col.iter().enumerate().take(h - 1) {
                    let expected = if y + 5 >= h { BlockType::Dirt } else { BlockType::Stone };
                    assert_eq!(*block, expected, "column ({x}, {z}) y={y} h={h}");
                }
                assert!(col[h..].iter().all(|b| b.is_air()));
            }
        }
    }

    #[test]
    fn test_top_block_overrides() {
        let generator = ChunkGenerator::new(&WorldConfig::test());
        let coord = ChunkCoord::new(0, 0);

        let desert = generator.generate(coord, Biome::Desert, &[]);
        let snow = generator.generate(coord, Biome::Snow, &[]);
        for z in 0..16 {
            for x in 0..16 {
                let top = desert.top_solid(x, z).unwrap();
                assert_eq!(desert.get(x, top, z), BlockType::Sand);
                if top > 0 {
                    assert_ne!(desert.get(x, top - 1, z), BlockType::Sand);
                }

                let top = snow.top_solid(x, z).unwrap();
                assert_eq!(snow.get(x, top, z), BlockType::Snow);
            }
        }
    }

    #[test]
    fn test_snow_line_rule() {
        let mut config = WorldConfig::test();
        // Everything above 0 length units is over the snow line
        config.biomes.hills.top_block = strata_core::TopBlockRule::SnowAbove {
            altitude: 0.0,
            below: BlockType::Stone,
        };
        let generator = ChunkGenerator::new(&config);
        let voxels = generator.generate(ChunkCoord::new(0, 0), Biome::Hills, &[]);

        for z in 0..16 {
            for x in 0..16 {
                let top = voxels.top_solid(x, z).unwrap();
                let expected = if top > 0 { BlockType::Snow } else { BlockType::Stone };
                assert_eq!(voxels.get(x, top, z), expected);
            }
        }
    }

    #[test]
    fn test_every_column_is_solid_at_bottom() {
        let generator = ChunkGenerator::new(&WorldConfig::test());
        for biome in Biome::ALL {
            let voxels = generator.generate(ChunkCoord::new(7, -7), biome, &[]);
            for z in 0..16 {
                for x in 0..16 {
                    assert!(voxels.get(x, 0, z).is_solid());
                    assert!(voxels.get(x, 99, z).is_air());
                }
            }
        }
    }
}
