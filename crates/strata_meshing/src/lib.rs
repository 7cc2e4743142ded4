//! # STRATA Meshing
//!
//! Compiles voxel buffers into triangle meshes for the host renderer.
//!
//! ## Components
//!
//! - `MeshData`: flat position / normal / UV / index arrays
//! - `GreedyMesher`: maximal same-material rectangles per plane
//! - `NaiveMesher`: one quad per exposed face
//!
//! Both meshers share the face rule: a face exists where exactly one side
//! of a boundary plane is solid, and it looks away from the solid side.
//! Anything outside the buffer is air.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_meshing::{mesher_for, Mesher};
//!
//! let mut mesher = mesher_for(config.mesher, config.block_size);
//! let mesh = mesher.build_mesh(&voxels);
//! host.upload(mesh.position_bytes(), mesh.index_bytes());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod greedy;
pub mod mesh;
pub mod naive;

pub use greedy::GreedyMesher;
pub use mesh::{atlas_cell, FaceDirection, MeshData, Quad};
pub use naive::NaiveMesher;

use strata_core::{MesherKind, VoxelBuffer};

/// Voxel-to-mesh compiler.
pub trait Mesher: Send {
    /// Builds the mesh for one chunk.
    fn build_mesh(&mut self, voxels: &VoxelBuffer) -> MeshData;
}

/// Creates the configured mesher.
#[must_use]
pub fn mesher_for(kind: MesherKind, block_size: f64) -> Box<dyn Mesher> {
    match kind {
        MesherKind::Greedy => Box::new(GreedyMesher::new(block_size)),
        MesherKind::Naive => Box::new(NaiveMesher::new(block_size)),
    }
}
