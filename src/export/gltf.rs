//! glTF/GLB export.

use crate::atlas::SkinAtlas;
use crate::error::{Result, SkinError};
use crate::mesher::geometry::{box_to_mesh, Mesh};
use crate::mesher::{BoxMesh, Layer, MesherConfig, Model, SurfaceMaterial};
use crate::types::PartTransform;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::mem;

const BASE_MATERIAL: u32 = 0;
const OVERLAY_MATERIAL: u32 = 1;

/// Export a model to GLB format (binary glTF) with the skin embedded as its
/// only texture.
///
/// Each body part becomes one node translated by the part offset, in model
/// order, under a single root node. Base and overlay shells are separate
/// primitives of the part's mesh using the base and overlay materials.
pub fn export_glb(model: &Model, atlas: &SkinAtlas) -> Result<Vec<u8>> {
    if model.is_empty() {
        return Err(SkinError::Export("Cannot export empty model".to_string()));
    }

    let texture_png = atlas.to_png()?;

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for (mesh_idx, part) in model.parts.iter().enumerate() {
        let mut primitives = Vec::new();
        for box_mesh in part.meshes() {
            // Geometry stays in part space, the node carries the offset
            let mesh = box_to_mesh(box_mesh, &PartTransform::default());
            let offsets = write_mesh(&mut buffer_data, &mesh);
            primitives.push(add_mesh_primitive(
                &offsets,
                material_index(box_mesh),
                box_mesh,
                &mut buffer_views,
                &mut accessors,
            ));
        }

        meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        });

        let translation = if part.transform.is_identity() {
            None
        } else {
            Some(part.transform.translation)
        };
        nodes.push(create_node(Some(mesh_idx as u32), None, translation));
    }

    let part_nodes: Vec<_> = (0..nodes.len() as u32).map(json::Index::new).collect();
    let root_node = nodes.len() as u32;
    nodes.push(create_node(None, Some(part_nodes), None));

    // Append skin texture PNG (aligned to 4 bytes)
    let texture_padding = (4 - (buffer_data.len() % 4)) % 4;
    buffer_data.extend(std::iter::repeat(0u8).take(texture_padding));
    let texture_offset = buffer_data.len();
    buffer_data.extend_from_slice(&texture_png);
    buffer_views.push(create_buffer_view(texture_offset, texture_png.len(), None));
    let image_view = buffer_views.len() as u32 - 1;

    let total_buffer_size = buffer_data.len();

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images: vec![json::Image {
            buffer_view: Some(json::Index::new(image_view)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        // Pixel-art skins: no filtering, no bleeding across the atlas edge
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: vec![json::Texture {
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(0),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        materials: layer_materials(model),
        meshes,
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(root_node)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| SkinError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(assemble_glb(json_string.as_bytes(), &buffer_data))
}

fn material_index(box_mesh: &BoxMesh) -> u32 {
    match box_mesh.layer {
        Layer::Base => BASE_MATERIAL,
        Layer::Overlay => OVERLAY_MATERIAL,
    }
}

/// The base and overlay materials, taking their settings from the first
/// shell of each layer found in the model.
fn layer_materials(model: &Model) -> Vec<json::Material> {
    let find = |layer: Layer, fallback: SurfaceMaterial| {
        model
            .parts
            .iter()
            .flat_map(|p| p.meshes())
            .find(|m| m.layer == layer)
            .map(|m| m.material)
            .unwrap_or(fallback)
    };

    let defaults = MesherConfig::default();
    let base = find(Layer::Base, defaults.base_material());
    let overlay = find(Layer::Overlay, defaults.overlay_material());

    vec![
        create_material_with_texture(base, 0),
        create_material_with_texture(overlay, 0),
    ]
}

/// Byte ranges of one mesh inside the binary buffer.
struct MeshOffsets {
    pos_offset: usize,
    pos_bytes: usize,
    norm_offset: usize,
    norm_bytes: usize,
    uv_offset: usize,
    uv_bytes: usize,
    idx_offset: usize,
    idx_bytes: usize,
    vertex_count: usize,
    index_count: usize,
}

fn write_mesh(buffer: &mut Vec<u8>, mesh: &Mesh) -> MeshOffsets {
    let positions = mesh.positions_flat();
    let normals = mesh.normals_flat();
    let uvs = mesh.uvs_flat();

    let pos_offset = buffer.len();
    buffer.extend_from_slice(bytemuck_cast_slice(&positions));
    let norm_offset = buffer.len();
    buffer.extend_from_slice(bytemuck_cast_slice(&normals));
    let uv_offset = buffer.len();
    buffer.extend_from_slice(bytemuck_cast_slice(&uvs));
    let idx_offset = buffer.len();
    buffer.extend_from_slice(bytemuck_cast_slice(&mesh.indices));
    let end = buffer.len();

    MeshOffsets {
        pos_offset,
        pos_bytes: norm_offset - pos_offset,
        norm_offset,
        norm_bytes: uv_offset - norm_offset,
        uv_offset,
        uv_bytes: idx_offset - uv_offset,
        idx_offset,
        idx_bytes: end - idx_offset,
        vertex_count: mesh.vertex_count(),
        index_count: mesh.indices.len(),
    }
}

/// Add buffer views and accessors for a mesh and return its primitive.
fn add_mesh_primitive(
    offsets: &MeshOffsets,
    material_idx: u32,
    box_mesh: &BoxMesh,
    buffer_views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
) -> json::mesh::Primitive {
    let accessor_start = accessors.len() as u32;
    let view_start = buffer_views.len() as u32;

    let array = Some(json::buffer::Target::ArrayBuffer);
    buffer_views.push(create_buffer_view(offsets.pos_offset, offsets.pos_bytes, array));
    buffer_views.push(create_buffer_view(offsets.norm_offset, offsets.norm_bytes, array));
    buffer_views.push(create_buffer_view(offsets.uv_offset, offsets.uv_bytes, array));
    buffer_views.push(create_buffer_view(
        offsets.idx_offset,
        offsets.idx_bytes,
        Some(json::buffer::Target::ElementArrayBuffer),
    ));

    let [hx, hy, hz] = box_mesh.half_extents();
    accessors.push(create_accessor(
        view_start,
        offsets.vertex_count,
        json::accessor::Type::Vec3,
        json::accessor::ComponentType::F32,
        Some([-hx, -hy, -hz]),
        Some([hx, hy, hz]),
    ));
    accessors.push(create_accessor(
        view_start + 1,
        offsets.vertex_count,
        json::accessor::Type::Vec3,
        json::accessor::ComponentType::F32,
        None,
        None,
    ));
    accessors.push(create_accessor(
        view_start + 2,
        offsets.vertex_count,
        json::accessor::Type::Vec2,
        json::accessor::ComponentType::F32,
        None,
        None,
    ));
    accessors.push(create_accessor(
        view_start + 3,
        offsets.index_count,
        json::accessor::Type::Scalar,
        json::accessor::ComponentType::U32,
        None,
        None,
    ));

    create_primitive(accessor_start, accessor_start + 3, material_idx)
}

/// Wrap a JSON document and binary buffer into a GLB container.
fn assemble_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF"); // magic
    glb.extend_from_slice(&2u32.to_le_bytes()); // version
    glb.extend_from_slice(&(total_size as u32).to_le_bytes()); // length

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // chunk type: JSON
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]); // padding (spaces)

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // chunk type: BIN
    glb.extend_from_slice(buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]); // padding (zeros)

    glb
}

fn create_node(
    mesh: Option<u32>,
    children: Option<Vec<json::Index<json::Node>>>,
    translation: Option<[f32; 3]>,
) -> json::Node {
    json::Node {
        camera: None,
        children,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: mesh.map(json::Index::new),
        rotation: None,
        scale: None,
        translation,
        skin: None,
        weights: None,
    }
}

/// Create a buffer view.
fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Create a primitive.
fn create_primitive(
    positions_accessor: u32,
    indices_accessor: u32,
    material: u32,
) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(positions_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(positions_accessor + 2),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create an alpha-masked material sampling the given texture.
fn create_material_with_texture(surface: SurfaceMaterial, texture_idx: u32) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: Some(json::texture::Info {
                index: json::Index::new(texture_idx),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Mask),
        alpha_cutoff: Some(json::material::AlphaCutoff(surface.alpha_cutoff)),
        double_sided: surface.double_sided,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of T to a slice of bytes.
fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SkinLayout;
    use crate::mesher::assemble;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn export(config: &MesherConfig) -> (Vec<u8>, serde_json::Value) {
        let atlas = SkinAtlas::solid([120, 80, 40, 255]);
        let model = assemble(&SkinLayout::classic(), &atlas, config).unwrap();
        let glb = export_glb(&model, &atlas).unwrap();

        let json_len = read_u32(&glb, 12) as usize;
        let doc = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        (glb, doc)
    }

    #[test]
    fn test_glb_header_and_chunks() {
        let (glb, _) = export(&MesherConfig::default());

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(read_u32(&glb, 16), 0x4E4F534A);

        let json_len = read_u32(&glb, 12) as usize;
        assert_eq!(json_len % 4, 0);
        let bin_header = 20 + json_len;
        assert_eq!(read_u32(&glb, bin_header + 4), 0x004E4942);
        assert_eq!(bin_header + 8 + read_u32(&glb, bin_header) as usize, glb.len());
    }

    #[test]
    fn test_one_node_per_part() {
        let (_, doc) = export(&MesherConfig::default());

        let nodes = doc["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 7);
        assert_eq!(nodes[6]["children"].as_array().unwrap().len(), 6);
        assert_eq!(doc["scenes"][0]["nodes"][0], 6);

        // Head sits ten units up, body has no translation
        assert_eq!(nodes[0]["translation"], serde_json::json!([0.0, 10.0, 0.0]));
        assert!(nodes[1].get("translation").is_none());
        assert_eq!(nodes[2]["translation"], serde_json::json!([-6.0, 0.0, 0.0]));

        let meshes = doc["meshes"].as_array().unwrap();
        assert_eq!(meshes.len(), 6);
        for mesh in meshes {
            let prims = mesh["primitives"].as_array().unwrap();
            assert_eq!(prims.len(), 2);
            assert_eq!(prims[0]["material"], 0);
            assert_eq!(prims[1]["material"], 1);
        }
    }

    #[test]
    fn test_materials() {
        let (_, doc) = export(&MesherConfig::default());
        let materials = doc["materials"].as_array().unwrap();

        assert_eq!(materials[0]["alphaMode"], "MASK");
        assert_eq!(materials[0]["alphaCutoff"], 0.5);
        assert!(materials[0].get("doubleSided").map_or(true, |v| v == false));

        assert_eq!(materials[1]["alphaMode"], "MASK");
        assert!((materials[1]["alphaCutoff"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(materials[1]["doubleSided"], true);

        assert_eq!(doc["samplers"][0]["magFilter"], 9728);
        assert_eq!(doc["samplers"][0]["wrapS"], 33071);
    }

    #[test]
    fn test_base_only_export() {
        let (_, doc) = export(&MesherConfig::default().with_overlay(false));
        for mesh in doc["meshes"].as_array().unwrap() {
            assert_eq!(mesh["primitives"].as_array().unwrap().len(), 1);
        }
        assert_eq!(doc["accessors"].as_array().unwrap().len(), 6 * 4);
    }

    #[test]
    fn test_export_empty_model_fails() {
        let model = Model { parts: Vec::new() };
        assert!(export_glb(&model, &SkinAtlas::solid([0; 4])).is_err());
    }
}
