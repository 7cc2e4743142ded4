//! # Voxel Buffer
//!
//! Dense block grid for one chunk, dimensions `(S, H, S)`, one byte per
//! voxel, indexed `(y * S + z) * S + x`. A fresh buffer is all `Air`.
//!
//! Reads outside the grid return `Air`; that is what lets the mesher
//! emit chunk-boundary faces without special cases.

use crate::block::BlockType;
use crate::error::{StorageError, StorageResult};

/// Block grid for one chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelBuffer {
    /// Width and depth in blocks.
    size: usize,
    /// Height in blocks.
    height: usize,
    /// Block bytes, every one a valid `BlockType`.
    blocks: Vec<u8>,
}

impl VoxelBuffer {
    /// Creates an all-air buffer.
    #[must_use]
    pub fn new(size: usize, height: usize) -> Self {
        Self {
            size,
            height,
            blocks: vec![BlockType::Air.as_u8(); size * size * height],
        }
    }

    /// Creates a buffer filled with one block.
    #[must_use]
    pub fn filled(size: usize, height: usize, block: BlockType) -> Self {
        Self {
            size,
            height,
            blocks: vec![block.as_u8(); size * size * height],
        }
    }

    /// Rebuilds a buffer from persisted bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SizeMismatch`] if the byte count is wrong and
    /// [`StorageError::UnknownBlock`] for any byte that is not a block.
    pub fn from_bytes(size: usize, height: usize, bytes: &[u8]) -> StorageResult<Self> {
        let expected = size * size * height;
        if bytes.len() != expected {
            return Err(StorageError::SizeMismatch {
                expected,
                found: bytes.len(),
            });
        }
        if let Some(&bad) = bytes.iter().find(|&&b| BlockType::from_u8(b).is_none()) {
            return Err(StorageError::UnknownBlock(bad));
        }
        Ok(Self {
            size,
            height,
            blocks: bytes.to_vec(),
        })
    }

    /// Width and depth in blocks.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Height in blocks.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Dimensions as `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        [self.size, self.height, self.size]
    }

    /// Raw block bytes in index order.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.blocks
    }

    #[inline]
    const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size + z) * self.size + x
    }

    /// Gets a block at local coordinates, `Air` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        if x < self.size && y < self.height && z < self.size {
            BlockType::from_u8(self.blocks[self.index(x, y, z)]).unwrap_or(BlockType::Air)
        } else {
            BlockType::Air
        }
    }

    /// Gets a block at signed local coordinates, `Air` outside the grid.
    #[inline]
    #[must_use]
    pub fn get_signed(&self, x: i64, y: i64, z: i64) -> BlockType {
        match (usize::try_from(x), usize::try_from(y), usize::try_from(z)) {
            (Ok(x), Ok(y), Ok(z)) => self.get(x, y, z),
            _ => BlockType::Air,
        }
    }

    /// Sets a block at local coordinates. Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        if x < self.size && y < self.height && z < self.size {
            let index = self.index(x, y, z);
            self.blocks[index] = block.as_u8();
        }
    }

    /// Returns true if every voxel is `Air`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == BlockType::Air.as_u8())
    }

    /// Number of non-air voxels.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|&&b| b != BlockType::Air.as_u8())
            .count()
    }

    /// Index of the topmost solid block in a column, if any.
    #[must_use]
    pub fn top_solid(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.height).rev().find(|&y| self.get(x, y, z).is_solid())
    }
}

impl std::fmt::Debug for VoxelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelBuffer")
            .field("size", &self.size)
            .field("height", &self.height)
            .field("solid", &self.solid_count())
            .finish()
    }
}
