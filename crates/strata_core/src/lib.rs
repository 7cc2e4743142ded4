//! # STRATA Core
//!
//! Shared vocabulary for the STRATA voxel world.
//!
//! ## Core Components
//!
//! - `WorldConfig`: immutable per-world configuration, threaded through
//!   every generator, mesher and scheduler call
//! - `BlockType` / `Biome` / `BiomeParams`: closed material and biome sets
//! - `ChunkCoord` / `RegionCoord`: floor-division grid coordinates
//! - `VoxelBuffer`: dense `(S, H, S)` block grid for one chunk
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{WorldConfig, ChunkCoord};
//!
//! let config = WorldConfig::from_toml_str("seed = 42\nview_distance = 4")?;
//! config.validate()?;
//!
//! let coord = ChunkCoord::from_block_pos(-1, 17, config.chunk_size);
//! assert_eq!(coord, ChunkCoord::new(-1, 1));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod biome;
pub mod block;
pub mod config;
pub mod coord;
pub mod error;
pub mod voxel;

pub use biome::{Biome, BiomeParams, BiomeTable, TopBlockRule};
pub use block::BlockType;
pub use config::{MesherKind, PersistenceConfig, WorldConfig};
pub use coord::{ChunkCoord, RegionCoord};
pub use error::{ConfigError, ConfigResult, StorageError, StorageResult};
pub use voxel::VoxelBuffer;
