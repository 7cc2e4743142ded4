//! # Grid Coordinates
//!
//! Chunk and region indices. Every world→grid conversion uses floor
//! division (`div_euclid`) so that block `-1` lands in chunk `-1`, not `0`.

use serde::{Deserialize, Serialize};

/// Chunk coordinate (identifies a chunk column in the world grid).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to the containing chunk.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32, chunk_size: u32) -> Self {
        let size = chunk_size as i32;
        Self {
            x: block_x.div_euclid(size),
            z: block_z.div_euclid(size),
        }
    }

    /// Returns the world X block coordinate of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self, chunk_size: u32) -> i32 {
        self.x * chunk_size as i32
    }

    /// Returns the world Z block coordinate of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_z(self, chunk_size: u32) -> i32 {
        self.z * chunk_size as i32
    }

    /// Returns this coordinate shifted by `(dx, dz)` chunks.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev (ring) distance in chunks.
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Squared Euclidean distance in chunks.
    #[inline]
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dz = u64::from(self.z.abs_diff(other.z));
        dx * dx + dz * dz
    }
}

/// Region coordinate (a coarse grid of square regions, several chunks wide).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RegionCoord {
    /// X coordinate (in regions).
    pub x: i32,
    /// Z coordinate (in regions).
    pub z: i32,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to the containing region.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32, region_size: u32) -> Self {
        let size = region_size as i32;
        Self {
            x: block_x.div_euclid(size),
            z: block_z.div_euclid(size),
        }
    }

    /// Returns the region containing a chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn from_chunk(coord: ChunkCoord, chunk_size: u32, region_size: u32) -> Self {
        Self::from_block_pos(
            coord.world_x(chunk_size),
            coord.world_z(chunk_size),
            region_size,
        )
    }

    /// Returns the world X block coordinate of the region's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self, region_size: u32) -> i32 {
        self.x * region_size as i32
    }

    /// Returns the world Z block coordinate of the region's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_z(self, region_size: u32) -> i32 {
        self.z * region_size as i32
    }

    /// Returns the 3×3 block of regions centred on this one, row by row.
    #[must_use]
    pub fn neighborhood(self) -> [Self; 9] {
        let mut out = [self; 9];
        let mut i = 0;
        for dz in -1..=1 {
            for dx in -1..=1 {
                out[i] = Self::new(self.x + dx, self.z + dz);
                i += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_block() {
        assert_eq!(ChunkCoord::from_block_pos(0, 0, 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(15, 15, 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(16, 16, 16), ChunkCoord::new(1, 1));
        assert_eq!(ChunkCoord::from_block_pos(-1, -1, 16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-16, -16, 16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-17, -17, 16), ChunkCoord::new(-2, -2));
    }

    #[test]
    fn test_region_floor_division() {
        assert_eq!(RegionCoord::from_block_pos(63, 0, 64), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::from_block_pos(64, -1, 64), RegionCoord::new(1, -1));
        assert_eq!(RegionCoord::from_block_pos(-64, -65, 64), RegionCoord::new(-1, -2));

        let chunk = ChunkCoord::new(-1, 4);
        assert_eq!(RegionCoord::from_chunk(chunk, 16, 64), RegionCoord::new(-1, 1));
    }

    #[test]
    fn test_distances() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(3, -2);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(a.distance_sq(b), 13);
    }

    #[test]
    fn test_neighborhood_is_3x3_row_major() {
        let n = RegionCoord::new(5, 5).neighborhood();
        assert_eq!(n[0], RegionCoord::new(4, 4));
        assert_eq!(n[4], RegionCoord::new(5, 5));
        assert_eq!(n[8], RegionCoord::new(6, 6));
    }
}
