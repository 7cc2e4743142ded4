//! Reference mesher: one quad per exposed voxel face.
//!
//! Same face rules as the greedy mesher with no merging. Useful for
//! debugging the greedy path and as the baseline in benchmarks.

use strata_core::VoxelBuffer;

use crate::mesh::{FaceDirection, MeshData, Quad};
use crate::Mesher;

/// One quad per exposed face.
#[derive(Clone, Copy, Debug)]
pub struct NaiveMesher {
    block_size: f32,
}

impl NaiveMesher {
    /// Creates a mesher emitting positions scaled by `block_size`.
    #[must_use]
    pub fn new(block_size: f64) -> Self {
        Self {
            block_size: block_size as f32,
        }
    }

    /// Meshes a voxel buffer.
    #[must_use]
    pub fn mesh(&self, voxels: &VoxelBuffer) -> MeshData {
        let mut mesh = MeshData::new();
        let [size_x, size_y, size_z] = voxels.dims();

        for y in 0..size_y {
            for z in 0..size_z {
                for x in 0..size_x {
                    let block = voxels.get(x, y, z);
                    if block.is_air() {
                        continue;
                    }

                    let pos = [x, y, z];
                    for axis in 0..3 {
                        let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
                        for direction in [FaceDirection::Negative, FaceDirection::Positive] {
                            let mut neighbor = pos.map(|c| c as i64);
                            let plane = match direction {
                                FaceDirection::Negative => {
                                    neighbor[axis] -= 1;
                                    pos[axis]
                                }
                                FaceDirection::Positive => {
                                    neighbor[axis] += 1;
                                    pos[axis] + 1
                                }
                            };

                            if voxels.get_signed(neighbor[0], neighbor[1], neighbor[2]).is_solid() {
                                continue;
                            }

                            mesh.push_quad(
                                &Quad {
                                    axis,
                                    plane,
                                    u: pos[u_axis],
                                    v: pos[v_axis],
                                    width: 1,
                                    height: 1,
                                    direction,
                                    material: block,
                                },
                                self.block_size,
                            );
                        }
                    }
                }
            }
        }

        mesh
    }
}

impl Mesher for NaiveMesher {
    fn build_mesh(&mut self, voxels: &VoxelBuffer) -> MeshData {
        self.mesh(voxels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::BlockType;

    #[test]
    fn test_single_voxel_has_six_faces() {
        let mut voxels = VoxelBuffer::new(8, 16);
        voxels.set(7, 15, 7, BlockType::Sand);
        assert_eq!(NaiveMesher::new(1.0).mesh(&voxels).quad_count(), 6);
    }

    #[test]
    fn test_row_is_not_merged() {
        let mut voxels = VoxelBuffer::new(8, 16);
        for x in 0..8 {
            voxels.set(x, 4, 4, BlockType::Stone);
        }
        // 2 end caps + 4 sides per voxel
        assert_eq!(NaiveMesher::new(1.0).mesh(&voxels).quad_count(), 2 + 4 * 8);
    }
}
