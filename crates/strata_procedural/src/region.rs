//! # Region Index
//!
//! Partitions the world into square regions, several chunks wide, and
//! assigns each a biome and an optional landmark site.
//!
//! A region's record is a pure function of `(seed, rx, rz)`:
//!
//! 1. SplitMix64-mix the seed with both coordinates into a 64-bit hash
//! 2. Seed a `ChaCha8Rng` from the hash
//! 3. Draw the biome from fixed probability bands
//! 4. Draw landmark presence with the biome's probability
//! 5. If present, draw a local offset inset from the region borders
//!
//! Records are cached for the life of the index; they can never go stale.

use std::collections::HashMap;

use parking_lot::RwLock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{Biome, BiomeTable, ChunkCoord, RegionCoord, WorldConfig};

/// Golden-ratio increment used by SplitMix64.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
/// Second mixing constant, folded in with the Z coordinate.
const Z_SALT: u64 = 0xBF58_476D_1CE4_E5B9;

/// Upper bounds of the biome probability bands.
const BIOME_BANDS: [(f64, Biome); 5] = [
    (0.22, Biome::Plains),
    (0.44, Biome::Forest),
    (0.62, Biome::Hills),
    (0.80, Biome::Desert),
    (1.00, Biome::Snow),
];

/// Landmark sites stay this many blocks away from region borders.
pub const LANDMARK_INSET_BLOCKS: u32 = 6;

/// SplitMix64 finalizer.
#[inline]
#[must_use]
pub const fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(GOLDEN_GAMMA);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Avalanche hash of a seed and a 2D integer coordinate.
#[inline]
#[must_use]
pub const fn hash_2d(seed: u64, x: i32, z: i32) -> u64 {
    let mut h = seed ^ (x as i64 as u64).wrapping_add(GOLDEN_GAMMA);
    h = splitmix64(h);
    h ^= (z as i64 as u64).wrapping_add(Z_SALT);
    splitmix64(h)
}

/// Per-region record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionInfo {
    /// Region this record describes.
    pub coord: RegionCoord,
    /// Biome for every chunk in the region.
    pub biome: Biome,
    /// Landmark site in blocks from the region's origin corner, if any.
    pub landmark_offset: Option<(u32, u32)>,
}

impl RegionInfo {
    /// Returns true if the region hosts a landmark.
    #[inline]
    #[must_use]
    pub const fn has_landmark(&self) -> bool {
        self.landmark_offset.is_some()
    }
}

/// Deterministic coarse-grid lookup with a permanent cache.
pub struct RegionIndex {
    seed: u64,
    chunk_size: u32,
    region_size: u32,
    biomes: BiomeTable,
    cache: RwLock<HashMap<RegionCoord, RegionInfo>>,
}

impl RegionIndex {
    /// Creates an index for a world.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            seed: config.seed,
            chunk_size: config.chunk_size,
            region_size: config.region_size_blocks,
            biomes: config.biomes.clone(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// World seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Region edge in blocks.
    #[inline]
    #[must_use]
    pub const fn region_size(&self) -> u32 {
        self.region_size
    }

    /// Returns the record for a region, computing and caching it on first use.
    #[must_use]
    pub fn get(&self, coord: RegionCoord) -> RegionInfo {
        if let Some(info) = self.cache.read().get(&coord) {
            return *info;
        }
        let info = self.compute(coord);
        *self.cache.write().entry(coord).or_insert(info)
    }

    /// Computes a record without touching the cache.
    #[must_use]
    pub fn compute(&self, coord: RegionCoord) -> RegionInfo {
        let hash = hash_2d(self.seed, coord.x, coord.z);
        let mut rng = ChaCha8Rng::seed_from_u64(hash);

        let roll: f64 = rng.gen();
        let biome = BIOME_BANDS
            .iter()
            .find(|(upper, _)| roll < *upper)
            .map_or(Biome::Snow, |&(_, biome)| biome);

        let probability = self.biomes.get(biome).landmark_probability;
        let landmark_offset = if rng.gen::<f64>() < probability {
            let span = f64::from(self.region_size.saturating_sub(2 * LANDMARK_INSET_BLOCKS));
            let ox = LANDMARK_INSET_BLOCKS + (rng.gen::<f64>() * span) as u32;
            let oz = LANDMARK_INSET_BLOCKS + (rng.gen::<f64>() * span) as u32;
            Some((ox, oz))
        } else {
            None
        };

        RegionInfo {
            coord,
            biome,
            landmark_offset,
        }
    }

    /// Region containing a world block.
    #[inline]
    #[must_use]
    pub const fn region_of_block(&self, block_x: i32, block_z: i32) -> RegionCoord {
        RegionCoord::from_block_pos(block_x, block_z, self.region_size)
    }

    /// Region containing a chunk.
    #[inline]
    #[must_use]
    pub const fn region_of_chunk(&self, coord: ChunkCoord) -> RegionCoord {
        RegionCoord::from_chunk(coord, self.chunk_size, self.region_size)
    }

    /// Biome of the region containing a chunk.
    #[must_use]
    pub fn biome_of_chunk(&self, coord: ChunkCoord) -> Biome {
        self.get(self.region_of_chunk(coord)).biome
    }

    /// Number of cached records.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

impl std::fmt::Debug for RegionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionIndex")
            .field("seed", &self.seed)
            .field("region_size", &self.region_size)
            .field("cached", &self.cached_len())
            .finish()
    }
}
