//! # Landmarks
//!
//! A landmark is a circular plateau centred on a chunk. Regions decide
//! whether a landmark exists and where; this registry turns those sites
//! into concrete [`Landmark`] records and remembers which regions it has
//! already materialized.
//!
//! Landmarks can reach into neighbouring regions, so before generating a
//! chunk the caller materializes the chunk's region and its 3×3
//! neighbourhood. Materializing a region twice is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use strata_core::{Biome, ChunkCoord, RegionCoord, WorldConfig};

use crate::region::{hash_2d, splitmix64, RegionIndex, RegionInfo};

/// Salt separating the radius stream from the region stream.
const RADIUS_SALT: u64 = 0x4C41_4E44_4D41_524B;

/// A circular terrain plateau.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Landmark {
    /// Region that owns the landmark.
    pub region: RegionCoord,
    /// Biome of the owning region; the plateau height is sampled with it.
    pub biome: Biome,
    /// Chunk at the centre of the footprint.
    pub center_chunk: ChunkCoord,
    /// Footprint radius in chunks.
    pub radius_chunks: u32,
}

impl Landmark {
    /// World block at the centre of the footprint.
    #[inline]
    #[must_use]
    pub const fn center_block(&self, chunk_size: u32) -> (i32, i32) {
        let half = (chunk_size / 2) as i32;
        (
            self.center_chunk.world_x(chunk_size) + half,
            self.center_chunk.world_z(chunk_size) + half,
        )
    }

    /// Footprint radius in blocks.
    #[inline]
    #[must_use]
    pub const fn radius_blocks(&self, chunk_size: u32) -> u32 {
        self.radius_chunks * chunk_size
    }

    /// Planar distance in blocks from the centre to a world block.
    #[must_use]
    pub fn distance_blocks(&self, block_x: i32, block_z: i32, chunk_size: u32) -> f64 {
        let (cx, cz) = self.center_block(chunk_size);
        let dx = f64::from(block_x) - f64::from(cx);
        let dz = f64::from(block_z) - f64::from(cz);
        dx.hypot(dz)
    }

    /// Returns true if a world block lies strictly inside the footprint.
    #[must_use]
    pub fn contains_block(&self, block_x: i32, block_z: i32, chunk_size: u32) -> bool {
        self.distance_blocks(block_x, block_z, chunk_size) < f64::from(self.radius_blocks(chunk_size))
    }
}

/// Idempotent landmark materialization.
pub struct LandmarkRegistry {
    regions: Arc<RegionIndex>,
    chunk_size: u32,
    min_radius: u32,
    max_radius: u32,
    realized: RwLock<HashMap<RegionCoord, Option<Landmark>>>,
}

impl LandmarkRegistry {
    /// Creates a registry over a region index.
    #[must_use]
    pub fn new(regions: Arc<RegionIndex>, config: &WorldConfig) -> Self {
        Self {
            regions,
            chunk_size: config.chunk_size,
            min_radius: config.landmark_min_radius_chunks,
            max_radius: config.landmark_max_radius_chunks,
            realized: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying region index.
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &Arc<RegionIndex> {
        &self.regions
    }

    /// Materializes one region's landmark (if it has one) and returns it.
    pub fn ensure_region(&self, region: RegionCoord) -> Option<Landmark> {
        if let Some(existing) = self.realized.read().get(&region) {
            return *existing;
        }

        let info = self.regions.get(region);
        let landmark = self.materialize(&info);
        if let Some(landmark) = &landmark {
            tracing::debug!(
                "Landmark materialized in region ({}, {}): center chunk ({}, {}), radius {}",
                region.x,
                region.z,
                landmark.center_chunk.x,
                landmark.center_chunk.z,
                landmark.radius_chunks
            );
        }
        *self.realized.write().entry(region).or_insert(landmark)
    }

    /// Materializes the 3×3 regions around a chunk's region.
    ///
    /// Returns the landmarks found, in fixed row-major region order.
    pub fn ensure_around_chunk(&self, coord: ChunkCoord) -> Vec<Landmark> {
        self.ensure_around_region(self.regions.region_of_chunk(coord))
    }

    /// Materializes the 3×3 regions around a world block's region.
    pub fn ensure_around_block(&self, block_x: i32, block_z: i32) -> Vec<Landmark> {
        self.ensure_around_region(self.regions.region_of_block(block_x, block_z))
    }

    fn ensure_around_region(&self, center: RegionCoord) -> Vec<Landmark> {
        center
            .neighborhood()
            .into_iter()
            .filter_map(|region| self.ensure_region(region))
            .collect()
    }

    /// First landmark whose footprint contains a world block.
    pub fn landmark_at(&self, block_x: i32, block_z: i32) -> Option<Landmark> {
        self.ensure_around_block(block_x, block_z)
            .into_iter()
            .find(|landmark| landmark.contains_block(block_x, block_z, self.chunk_size))
    }

    /// Number of regions materialized so far (with or without a landmark).
    #[must_use]
    pub fn realized_len(&self) -> usize {
        self.realized.read().len()
    }

    fn materialize(&self, info: &RegionInfo) -> Option<Landmark> {
        let (ox, oz) = info.landmark_offset?;
        let region_size = self.regions.region_size();

        let site_x = info.coord.world_x(region_size) + ox as i32;
        let site_z = info.coord.world_z(region_size) + oz as i32;
        let center_chunk = ChunkCoord::from_block_pos(site_x, site_z, self.chunk_size);

        Some(Landmark {
            region: info.coord,
            biome: info.biome,
            center_chunk,
            radius_chunks: self.radius_for(info.coord),
        })
    }

    fn radius_for(&self, region: RegionCoord) -> u32 {
        let hash = splitmix64(hash_2d(self.regions.seed() ^ RADIUS_SALT, region.x, region.z));
        // Top 53 bits as a unit float
        let unit = (hash >> 11) as f64 / (1u64 << 53) as f64;
        let span = self.max_radius - self.min_radius + 1;
        (self.min_radius + (unit * f64::from(span)) as u32).min(self.max_radius)
    }
}

impl std::fmt::Debug for LandmarkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandmarkRegistry")
            .field("realized", &self.realized_len())
            .finish_non_exhaustive()
    }
}
