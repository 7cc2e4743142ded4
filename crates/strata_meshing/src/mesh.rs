//! Mesh output shared by every mesher.
//!
//! Each quad is four vertices (origin, `+du`, `+du+dv`, `+dv`) and six
//! indices. Positive faces wind `0,1,2 / 0,2,3`, which is counter-clockwise
//! seen from the `+axis` side; negative faces use the mirrored
//! `0,2,1 / 0,3,2`.

use strata_core::BlockType;

/// Index pattern for faces whose normal points along `+axis`.
const POSITIVE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];
/// Index pattern for faces whose normal points along `-axis`.
const NEGATIVE_INDICES: [u32; 6] = [0, 2, 1, 0, 3, 2];

/// Atlas layout: 2 columns by 3 rows.
const ATLAS_COLUMNS: f32 = 2.0;
const ATLAS_ROWS: f32 = 3.0;

/// Which side of its boundary plane a face looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    /// Normal along `+axis`; the solid voxel is on the low side.
    Positive,
    /// Normal along `-axis`; the solid voxel is on the high side.
    Negative,
}

impl FaceDirection {
    /// Sign of the normal.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Atlas cell `(column, row)` for a block.
#[must_use]
pub const fn atlas_cell(block: BlockType) -> (u32, u32) {
    match block {
        BlockType::Snow => (0, 0),
        BlockType::Stone => (1, 0),
        BlockType::Sand => (0, 1),
        BlockType::Dirt => (1, 1),
        BlockType::Grass => (0, 2),
        BlockType::Air => (1, 2),
    }
}

/// One axis-aligned rectangle of faces, in voxel units.
///
/// `axis` is the normal axis; `u` and `v` are `(axis + 1) % 3` and
/// `(axis + 2) % 3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad {
    /// Normal axis (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// Boundary plane index along `axis`.
    pub plane: usize,
    /// Start along `u`.
    pub u: usize,
    /// Start along `v`.
    pub v: usize,
    /// Extent along `u`.
    pub width: usize,
    /// Extent along `v`.
    pub height: usize,
    /// Facing.
    pub direction: FaceDirection,
    /// Material of the solid voxel behind the face.
    pub material: BlockType,
}

/// Triangle mesh for one chunk.
///
/// Positions are chunk-local, in length units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Atlas texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quads.
    #[inline]
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if the mesh has no geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions as raw bytes.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normals as raw bytes.
    #[must_use]
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// UVs as raw bytes.
    #[must_use]
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Indices as raw bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Appends one quad, scaling voxel coordinates by `block_size`.
    pub fn push_quad(&mut self, quad: &Quad, block_size: f32) {
        let (u_axis, v_axis) = ((quad.axis + 1) % 3, (quad.axis + 2) % 3);

        let mut origin = [0.0f32; 3];
        origin[quad.axis] = quad.plane as f32 * block_size;
        origin[u_axis] = quad.u as f32 * block_size;
        origin[v_axis] = quad.v as f32 * block_size;

        let mut du = [0.0f32; 3];
        du[u_axis] = quad.width as f32 * block_size;
        let mut dv = [0.0f32; 3];
        dv[v_axis] = quad.height as f32 * block_size;

        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&[
            origin,
            add(origin, du),
            add(add(origin, du), dv),
            add(origin, dv),
        ]);

        let mut normal = [0.0f32; 3];
        normal[quad.axis] = quad.direction.sign();
        self.normals.extend_from_slice(&[normal; 4]);

        let (column, row) = atlas_cell(quad.material);
        let u0 = column as f32 / ATLAS_COLUMNS;
        let u1 = (column + 1) as f32 / ATLAS_COLUMNS;
        let v0 = row as f32 / ATLAS_ROWS;
        let v1 = (row + 1) as f32 / ATLAS_ROWS;
        self.uvs.extend_from_slice(&[[u0, v0], [u1, v0], [u1, v1], [u0, v1]]);

        let pattern = match quad.direction {
            FaceDirection::Positive => &POSITIVE_INDICES,
            FaceDirection::Negative => &NEGATIVE_INDICES,
        };
        self.indices.extend(pattern.iter().map(|i| base + i));
    }
}

#[inline]
fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(direction: FaceDirection) -> Quad {
        Quad {
            axis: 1,
            plane: 3,
            u: 1,
            v: 2,
            width: 4,
            height: 2,
            direction,
            material: BlockType::Grass,
        }
    }

    #[test]
    fn test_push_quad_layout() {
        let mut mesh = MeshData::new();
        mesh.push_quad(&quad(FaceDirection::Positive), 1.0);

        // y-normal quad: u = z, v = x
        assert_eq!(mesh.positions[0], [2.0, 3.0, 1.0]);
        assert_eq!(mesh.positions[1], [2.0, 3.0, 5.0]);
        assert_eq!(mesh.positions[2], [4.0, 3.0, 5.0]);
        assert_eq!(mesh.positions[3], [4.0, 3.0, 1.0]);
        assert_eq!(mesh.normals, vec![[0.0, 1.0, 0.0]; 4]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_negative_quad_is_mirrored() {
        let mut mesh = MeshData::new();
        mesh.push_quad(&quad(FaceDirection::Positive), 0.5);
        mesh.push_quad(&quad(FaceDirection::Negative), 0.5);

        assert_eq!(&mesh.indices[6..], &[4, 6, 5, 4, 7, 6]);
        assert_eq!(mesh.normals[4], [0.0, -1.0, 0.0]);
        assert_eq!(mesh.positions[1], [1.0, 1.5, 2.5]);
    }

    #[test]
    fn test_atlas_cells_are_distinct() {
        let mut cells: Vec<_> = BlockType::ALL.iter().map(|&b| atlas_cell(b)).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), BlockType::ALL.len());
        assert!(cells.iter().all(|&(c, r)| c < 2 && r < 3));
    }

    #[test]
    fn test_byte_views() {
        let mut mesh = MeshData::new();
        mesh.push_quad(&quad(FaceDirection::Positive), 1.0);

        assert_eq!(mesh.position_bytes().len(), 4 * 12);
        assert_eq!(mesh.normal_bytes().len(), 4 * 12);
        assert_eq!(mesh.uv_bytes().len(), 4 * 8);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }

    #[test]
    fn test_grass_uvs() {
        let mut mesh = MeshData::new();
        mesh.push_quad(&quad(FaceDirection::Positive), 1.0);
        let third = 1.0 / 3.0;
        assert_eq!(mesh.uvs[0], [0.0, 2.0 * third]);
        assert_eq!(mesh.uvs[2], [0.5, 1.0]);
    }
}
