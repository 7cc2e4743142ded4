//! Greedy Meshing algorithm for voxel buffers.
//!
//! Merges adjacent coplanar faces with the same material and facing into
//! maximal rectangles.
//!
//! ## Algorithm
//!
//! 1. For each axis `d` (with `u = (d+1) % 3`, `v = (d+2) % 3`):
//! 2. Sweep boundary planes `p = 0 ..= dim[d]`
//! 3. Build a 2D mask: a face where exactly one of the voxels at `p-1`
//!    and `p` is solid, tagged with its material and facing
//! 4. Greedily grow rectangles along `u`, then `v`, clearing what they use
//! 5. Emit one quad per rectangle on plane `p`
//!
//! Voxels outside the buffer read as air, so chunk borders always get faces.

use strata_core::{BlockType, VoxelBuffer};

use crate::mesh::{FaceDirection, MeshData, Quad};
use crate::Mesher;

/// Face mask entry for greedy meshing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FaceMask {
    material: BlockType,
    direction: FaceDirection,
}

impl FaceMask {
    /// Face between `behind` (at `p-1`) and `ahead` (at `p`), if any.
    #[inline]
    fn between(behind: BlockType, ahead: BlockType) -> Option<Self> {
        match (behind.is_solid(), ahead.is_solid()) {
            (true, false) => Some(Self {
                material: behind,
                direction: FaceDirection::Positive,
            }),
            (false, true) => Some(Self {
                material: ahead,
                direction: FaceDirection::Negative,
            }),
            _ => None,
        }
    }
}

/// Greedy meshing engine.
///
/// Keeps its mask between calls; one mesher per worker thread.
#[derive(Debug)]
pub struct GreedyMesher {
    block_size: f32,
    /// Working mask, `v`-major.
    mask: Vec<Option<FaceMask>>,
}

impl GreedyMesher {
    /// Creates a mesher emitting positions scaled by `block_size`.
    #[must_use]
    pub fn new(block_size: f64) -> Self {
        Self {
            block_size: block_size as f32,
            mask: Vec::new(),
        }
    }

    /// Meshes a voxel buffer.
    #[must_use]
    pub fn mesh(&mut self, voxels: &VoxelBuffer) -> MeshData {
        let mut mesh = MeshData::new();
        if voxels.is_empty() {
            return mesh;
        }

        let dims = voxels.dims();
        for axis in 0..3 {
            self.mesh_axis(voxels, dims, axis, &mut mesh);
        }

        tracing::trace!(
            "Greedy mesh: {} quads from {} solid voxels",
            mesh.quad_count(),
            voxels.solid_count()
        );
        mesh
    }

    fn mesh_axis(&mut self, voxels: &VoxelBuffer, dims: [usize; 3], axis: usize, mesh: &mut MeshData) {
        let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
        let (width, height) = (dims[u_axis], dims[v_axis]);

        self.mask.clear();
        self.mask.resize(width * height, None);

        for plane in 0..=dims[axis] {
            self.build_mask(voxels, axis, plane, width, height);
            self.extract(mesh, axis, plane, width, height);
        }
    }

    /// Fills the mask for boundary plane `plane`.
    fn build_mask(&mut self, voxels: &VoxelBuffer, axis: usize, plane: usize, width: usize, height: usize) {
        let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);

        for v in 0..height {
            for u in 0..width {
                let mut pos = [0i64; 3];
                pos[axis] = plane as i64;
                pos[u_axis] = u as i64;
                pos[v_axis] = v as i64;

                let ahead = voxels.get_signed(pos[0], pos[1], pos[2]);
                pos[axis] -= 1;
                let behind = voxels.get_signed(pos[0], pos[1], pos[2]);

                self.mask[v * width + u] = FaceMask::between(behind, ahead);
            }
        }
    }

    /// Greedily extracts quads from the mask, clearing it as it goes.
    fn extract(&mut self, mesh: &mut MeshData, axis: usize, plane: usize, width: usize, height: usize) {
        for v in 0..height {
            let mut u = 0;
            while u < width {
                let Some(face) = self.mask[v * width + u] else {
                    u += 1;
                    continue;
                };

                // Find width - extend as far as possible with the same face
                let mut run = 1;
                while u + run < width && self.mask[v * width + u + run] == Some(face) {
                    run += 1;
                }

                // Find height - extend rows with a matching run
                let mut rows = 1;
                'height: while v + rows < height {
                    let row = (v + rows) * width;
                    for du in 0..run {
                        if self.mask[row + u + du] != Some(face) {
                            break 'height;
                        }
                    }
                    rows += 1;
                }

                mesh.push_quad(
                    &Quad {
                        axis,
                        plane,
                        u,
                        v,
                        width: run,
                        height: rows,
                        direction: face.direction,
                        material: face.material,
                    },
                    self.block_size,
                );

                // Clear used cells from mask
                for dv in 0..rows {
                    let row = (v + dv) * width;
                    self.mask[row + u..row + u + run].fill(None);
                }

                u += run;
            }
        }
    }
}

impl Mesher for GreedyMesher {
    fn build_mesh(&mut self, voxels: &VoxelBuffer) -> MeshData {
        self.mesh(voxels)
    }
}
