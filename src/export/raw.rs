//! Raw mesh data export for custom rendering.

use crate::atlas::SkinAtlas;
use crate::mesher::geometry::Mesh;
use crate::mesher::Model;

/// Raw mesh data for custom use.
#[derive(Debug)]
pub struct RawMeshData {
    /// Vertex positions (3 floats per vertex).
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (2 floats per vertex).
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Index into `indices` where overlay triangles start. Everything
    /// before it belongs to base shells.
    pub overlay_index_start: usize,
    /// Skin RGBA data.
    pub texture_rgba: Vec<u8>,
    /// Skin width.
    pub texture_width: u32,
    /// Skin height.
    pub texture_height: u32,
}

/// Export a model as raw world-space data.
/// Base shells come first, then overlay shells, so the two can be drawn
/// with different materials from one buffer.
pub fn export_raw(model: &Model, atlas: &SkinAtlas) -> RawMeshData {
    let mut mesh = model.base_mesh();
    let overlay_index_start = mesh.indices.len();
    mesh.merge(&model.overlay_mesh());

    let Mesh { vertices, indices } = mesh;

    RawMeshData {
        positions: vertices.iter().map(|v| v.position).collect(),
        normals: vertices.iter().map(|v| v.normal).collect(),
        uvs: vertices.iter().map(|v| v.uv).collect(),
        indices,
        overlay_index_start,
        texture_rgba: atlas.as_raw().to_vec(),
        texture_width: atlas.width(),
        texture_height: atlas.height(),
    }
}

impl RawMeshData {
    /// Get positions as a flat array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Get normals as a flat array.
    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.iter().copied()).collect()
    }

    /// Get UVs as a flat array.
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.iter().copied()).collect()
    }

    /// Base shell indices.
    pub fn base_indices(&self) -> &[u32] {
        &self.indices[..self.overlay_index_start]
    }

    /// Overlay shell indices.
    pub fn overlay_indices(&self) -> &[u32] {
        &self.indices[self.overlay_index_start..]
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
