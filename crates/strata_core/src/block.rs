//! # Block Types
//!
//! The closed set of voxel materials. Stored as one byte per voxel;
//! `Air` is the zero value so a zeroed buffer is an empty chunk.

use serde::{Deserialize, Serialize};

/// A voxel material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Never emits a face.
    #[default]
    Air = 0,
    /// Topsoil with vegetation.
    Grass = 1,
    /// Subsoil below the surface block.
    Dirt = 2,
    /// Bedrock layer below the dirt.
    Stone = 3,
    /// Desert surface.
    Sand = 4,
    /// Cold / high-altitude surface.
    Snow = 5,
}

impl BlockType {
    /// Every block type, in byte order.
    pub const ALL: [Self; 6] = [
        Self::Air,
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Sand,
        Self::Snow,
    ];

    /// Converts from the stored byte.
    ///
    /// Returns `None` for bytes that do not name a block, so corrupt
    /// persisted data can be detected rather than silently remapped.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Air),
            1 => Some(Self::Grass),
            2 => Some(Self::Dirt),
            3 => Some(Self::Stone),
            4 => Some(Self::Sand),
            5 => Some(Self::Snow),
            _ => None,
        }
    }

    /// Returns the stored byte.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for `Air`.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Returns true for every non-air block.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !self.is_air()
    }
}
