//! # STRATA Procedural Generation
//!
//! Deterministic world generation for infinite, reproducible worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Chunked**: World is generated in fixed-size columns
//! 3. **Streamable**: Chunks can be generated/discarded independently
//! 4. **Region-aware**: Biomes and landmarks come from a coarse grid that
//!    never depends on which chunks happen to be loaded
//!
//! ## Core Components
//!
//! - `NoiseSource`: seeded 2D simplex, fBm and domain warp
//! - `RegionIndex`: per-region biome and landmark draws
//! - `LandmarkRegistry`: idempotent landmark materialization
//! - `HeightFieldSampler`: column heights with plateaus and smoothing
//! - `ChunkGenerator`: voxel buffers from heights
//! - `ChunkStorage`: optional on-disk chunk cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_core::{ChunkCoord, WorldConfig};
//! use strata_procedural::{ChunkGenerator, LandmarkRegistry, RegionIndex};
//!
//! let config = WorldConfig::test();
//! let regions = Arc::new(RegionIndex::new(&config));
//! let landmarks = LandmarkRegistry::new(Arc::clone(&regions), &config);
//! let generator = ChunkGenerator::new(&config);
//!
//! let coord = ChunkCoord::new(0, 0);
//! let nearby = landmarks.ensure_around_chunk(coord);
//! let voxels = generator.generate(coord, regions.biome_of_chunk(coord), &nearby);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod height;
pub mod landmark;
pub mod noise;
pub mod region;
pub mod storage;

pub use chunk::ChunkGenerator;
pub use height::{HeightFieldSampler, HeightGrid};
pub use landmark::{Landmark, LandmarkRegistry};
pub use noise::NoiseSource;
pub use region::{RegionIndex, RegionInfo};
pub use storage::ChunkStorage;
