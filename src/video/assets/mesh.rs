//! Indexed triangle meshes. Every attribute lives in its own vertex buffer
//! and is bound to a fixed attribute location:
//!
//! | Location | Attribute   |
//! |----------|-------------|
//! | 0        | `position`  |
//! | 1        | `normal`    |
//! | 2        | `texcoord`  |
//! | 3        | `tangent`   |
//! | 4        | `bitangent` |

use crate::math::prelude::{Vector2, Vector3};

impl_handle!(MeshHandle);

/// Which optional attributes a mesh carries.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MeshAttributes {
    pub normals: bool,
    pub texcoords: bool,
    pub tangents: bool,
    pub bitangents: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeshParams {
    pub num_verts: usize,
    pub num_idxes: usize,
    pub attributes: MeshAttributes,
}

impl MeshParams {
    /// Returns the number of triangles drawn by this mesh.
    #[inline]
    pub fn triangles(&self) -> u32 {
        (self.num_idxes / 3) as u32
    }
}

/// CPU-side vertex and index data. Optional attributes are either empty or
/// exactly as long as `positions`.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub texcoords: Vec<Vector2<f32>>,
    pub tangents: Vec<Vector3<f32>>,
    pub bitangents: Vec<Vector3<f32>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn params(&self) -> MeshParams {
        MeshParams {
            num_verts: self.positions.len(),
            num_idxes: self.indices.len(),
            attributes: MeshAttributes {
                normals: !self.normals.is_empty(),
                texcoords: !self.texcoords.is_empty(),
                tangents: !self.tangents.is_empty(),
                bitangents: !self.bitangents.is_empty(),
            },
        }
    }

    /// A unit cube centered at the origin, used for light markers and the
    /// skybox.
    pub fn cube() -> MeshData {
        let corners: [[f32; 3]; 8] = [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];

        // Each face as a quad of corner indices, counter-clockwise from outside.
        let faces: [([usize; 4], [f32; 3]); 6] = [
            ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
            ([1, 0, 3, 2], [0.0, 0.0, -1.0]),
            ([5, 1, 2, 6], [1.0, 0.0, 0.0]),
            ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
            ([7, 6, 2, 3], [0.0, 1.0, 0.0]),
            ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ];

        let uvs: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut data = MeshData::default();
        for (quad, normal) in faces.iter() {
            let base = data.positions.len() as u32;
            for (i, &corner) in quad.iter().enumerate() {
                data.positions.push(corners[corner].into());
                data.normals.push((*normal).into());
                data.texcoords.push(uvs[i].into());
            }

            data.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        data
    }

    /// A quad covering the whole clip space, used by screen-space passes.
    pub fn quad() -> MeshData {
        MeshData {
            positions: vec![
                Vector3::new(-1.0, -1.0, 0.0),
                Vector3::new(1.0, -1.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(-1.0, 1.0, 0.0),
            ],
            texcoords: vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        }
    }
}
