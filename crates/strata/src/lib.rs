//! # STRATA
//!
//! Procedural voxel terrain, streamed around an observer.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          STRATA                               │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │
//! │  │ strata_core   │──>│ procedural    │──>│ meshing       │    │
//! │  │ • WorldConfig │   │ • Noise       │   │ • Greedy      │    │
//! │  │ • Coords      │   │ • Regions     │   │ • Naive       │    │
//! │  │ • Voxels      │   │ • Heights     │   │ • MeshData    │    │
//! │  └───────────────┘   └───────┬───────┘   └───────┬───────┘    │
//! │                              │                   │            │
//! │                      ┌───────▼───────────────────▼───────┐    │
//! │                      │ streaming                         │    │
//! │                      │ • Scheduler  • Workers  • Host    │    │
//! │                      └───────────────────────────────────┘    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `headless`: a renderer-free run against a counting host

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod headless;

pub use strata_core;
pub use strata_meshing;
pub use strata_procedural;
pub use strata_streaming;

/// Commonly used types.
pub mod prelude {
    pub use strata_core::{
        Biome, BlockType, ChunkCoord, ConfigError, MesherKind, VoxelBuffer, WorldConfig,
    };
    pub use strata_meshing::{mesher_for, MeshData, Mesher};
    pub use strata_procedural::{ChunkGenerator, Landmark};
    pub use strata_streaming::{ChunkHost, ChunkState, Observer, StreamingScheduler, StreamingStats};
}
