//! # Build Priority
//!
//! Orders candidate chunks nearest ring first, then front-first within a
//! ring, then by squared distance, then by coordinate. The coordinate
//! tiebreak makes the order total, so two runs dispatch identically.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use strata_core::ChunkCoord;

/// Facing bias resolution: `1 - dot` is stored in thousandths.
const FACING_SCALE: f64 = 1000.0;

/// Forward vectors shorter than this fall back to `+Z`.
const MIN_FORWARD_LEN: f64 = 1e-6;

/// Where the player (or camera) is and which way it looks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    /// World X in length units.
    pub x: f64,
    /// World Z in length units.
    pub z: f64,
    /// Forward direction X (need not be normalized).
    pub forward_x: f64,
    /// Forward direction Z.
    pub forward_z: f64,
}

impl Observer {
    /// An observer at `(x, z)` looking along `+Z`.
    #[must_use]
    pub const fn new(x: f64, z: f64) -> Self {
        Self {
            x,
            z,
            forward_x: 0.0,
            forward_z: 1.0,
        }
    }

    /// The same observer looking along `(forward_x, forward_z)`.
    #[must_use]
    pub fn facing(mut self, forward_x: f64, forward_z: f64) -> Self {
        self.forward_x = forward_x;
        self.forward_z = forward_z;
        self
    }

    /// Unit forward vector, `+Z` when the input is near zero.
    #[must_use]
    pub fn forward(&self) -> (f64, f64) {
        let len = self.forward_x.hypot(self.forward_z);
        if len < MIN_FORWARD_LEN {
            (0.0, 1.0)
        } else {
            (self.forward_x / len, self.forward_z / len)
        }
    }

    /// Chunk under the observer.
    #[must_use]
    pub fn chunk(&self, chunk_size: u32, block_size: f64) -> ChunkCoord {
        let block_x = (self.x / block_size).floor() as i32;
        let block_z = (self.z / block_size).floor() as i32;
        ChunkCoord::from_block_pos(block_x, block_z, chunk_size)
    }
}

/// Total order over candidate chunks; smaller builds first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityKey {
    /// Chebyshev ring around the observer's chunk.
    pub ring: u32,
    /// `1 - dot(forward, direction)` in thousandths; 0 is dead ahead.
    pub facing: u32,
    /// Squared Euclidean distance in chunks.
    pub distance_sq: u64,
    /// Final tiebreak.
    pub coord: ChunkCoord,
}

impl PriorityKey {
    /// Key for `coord` seen from `center` looking along unit `forward`.
    #[must_use]
    pub fn new(coord: ChunkCoord, center: ChunkCoord, forward: (f64, f64)) -> Self {
        let dx = f64::from(coord.x - center.x);
        let dz = f64::from(coord.z - center.z);
        let len = dx.hypot(dz);
        let dot = if len > 0.0 {
            (forward.0 * dx + forward.1 * dz) / len
        } else {
            0.0
        };

        Self {
            ring: coord.chebyshev_distance(center),
            facing: ((1.0 - dot.clamp(-1.0, 1.0)) * FACING_SCALE).round() as u32,
            distance_sq: coord.distance_sq(center),
            coord,
        }
    }
}

/// Min-queue of candidate chunks.
pub type BuildQueue = BinaryHeap<Reverse<PriorityKey>>;

/// Builds the queue for one scan.
#[must_use]
pub fn build_queue(
    candidates: impl IntoIterator<Item = ChunkCoord>,
    center: ChunkCoord,
    forward: (f64, f64),
) -> BuildQueue {
    candidates
        .into_iter()
        .map(|coord| Reverse(PriorityKey::new(coord, center, forward)))
        .collect()
}
