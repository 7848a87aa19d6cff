//! Mesh geometry types.
//!
//! Expands [`BoxMesh`] descriptors into triangle meshes for exporters and
//! renderers that do not ship their own box primitive.

use super::part::BoxMesh;
use crate::types::PartTransform;

/// A vertex in the output mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: [f32; 3],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates (bottom-left origin).
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a box face given its vertices in top-left, top-right,
    /// bottom-left, bottom-right order. Triangles are wound CCW seen from
    /// the front.
    pub fn add_face_quad(&mut self, tl: u32, tr: u32, bl: u32, br: u32) {
        self.add_triangle(tl, bl, tr);
        self.add_triangle(bl, br, tr);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);

        for index in &other.indices {
            self.indices.push(index + offset);
        }
    }

    /// Get positions as a flat array (for glTF export).
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.position)
            .collect()
    }

    /// Get normals as a flat array (for glTF export).
    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.normal)
            .collect()
    }

    /// Get UVs as a flat array (for glTF export).
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.uv)
            .collect()
    }
}

/// Expand a box descriptor into 24 vertices and 12 triangles, placed with
/// `transform`. Faces are emitted in canonical order, four vertices each.
pub fn box_to_mesh(box_mesh: &BoxMesh, transform: &PartTransform) -> Mesh {
    let half = box_mesh.half_extents();
    let mut mesh = Mesh {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
    };

    for mapping in &box_mesh.faces {
        let normal = mapping.face.normal();
        let corners = mapping.face.corners();

        let mut idx = [0u32; 4];
        for (i, corner) in corners.iter().enumerate() {
            let local = [corner[0] * half[0], corner[1] * half[1], corner[2] * half[2]];
            idx[i] = mesh.add_vertex(Vertex::new(
                transform.apply(local),
                normal,
                mapping.uv.corners[i],
            ));
        }
        mesh.add_face_quad(idx[0], idx[1], idx[2], idx[3]);
    }

    mesh
}
