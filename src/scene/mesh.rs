use glam::Vec3;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// An indexed triangle mesh: flat vertex buffers plus an index buffer.
///
/// `positions` holds 3 floats per vertex, `normals` the same (empty until
/// computed), `uvs` 2 floats per vertex (optional). Each consecutive index
/// triple is one triangular face referencing vertices by position index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<f32>,
    #[serde(default)]
    pub normals: Vec<f32>,
    #[serde(default)]
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndexBuffer(usize),
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("position buffer length {0} is not a multiple of 3")]
    RaggedPositionBuffer(usize),
}

impl MeshData {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { positions, normals: Vec::new(), uvs: Vec::new(), indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh carries an index buffer. Non-indexed meshes are not
    /// editable by the face tools.
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let i = vertex * 3;
        Vec3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// The three vertex indices of a face, or None when out of range.
    pub fn face_indices(&self, face: usize) -> Option<[u32; 3]> {
        let i = face * 3;
        if i + 3 > self.indices.len() {
            return None;
        }
        Some([self.indices[i], self.indices[i + 1], self.indices[i + 2]])
    }

    /// The three corner positions of a face, or None when out of range.
    pub fn face_corners(&self, face: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.face_indices(face)?;
        Some([
            self.position(a as usize),
            self.position(b as usize),
            self.position(c as usize),
        ])
    }

    /// Check the structural invariants: buffer lengths and index range.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.positions.len() % 3 != 0 {
            return Err(MeshError::RaggedPositionBuffer(self.positions.len()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndexBuffer(self.indices.len()));
        }
        let vertex_count = self.vertex_count();
        for &index in &self.indices {
            if index as usize >= vertex_count {
                return Err(MeshError::IndexOutOfBounds { index, vertex_count });
            }
        }
        Ok(())
    }

    /// Recompute smooth per-vertex normals over the whole mesh.
    ///
    /// Face normals are accumulated area-weighted (unnormalized cross
    /// products) and normalized per vertex, so shared vertices shade smoothly
    /// across old and new geometry alike.
    pub fn recompute_normals(&mut self) {
        let vertex_count = self.vertex_count();
        let mut accum = vec![Vec3::ZERO; vertex_count];

        for face in 0..self.face_count() {
            let [ia, ib, ic] = match self.face_indices(face) {
                Some(tri) => tri,
                None => continue,
            };
            let a = self.position(ia as usize);
            let b = self.position(ib as usize);
            let c = self.position(ic as usize);
            let face_normal = (b - a).cross(c - a);
            accum[ia as usize] += face_normal;
            accum[ib as usize] += face_normal;
            accum[ic as usize] += face_normal;
        }

        self.normals.clear();
        self.normals.reserve(vertex_count * 3);
        for n in accum {
            let n = n.normalize_or_zero();
            self.normals.extend_from_slice(&[n.x, n.y, n.z]);
        }
    }

    /// Push a vertex position, keeping the uv buffer parallel if present.
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        if !self.uvs.is_empty() {
            self.uvs.extend_from_slice(&[0.0, 0.0]);
        }
        index
    }
}
