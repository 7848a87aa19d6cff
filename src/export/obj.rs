//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format. Each shell of
//! each body part is written as its own group, in world space.

use crate::atlas::SkinAtlas;
use crate::error::{Result, SkinError};
use crate::mesher::geometry::box_to_mesh;
use crate::mesher::{Layer, Model};
use std::fmt::Write;

/// Export a model to OBJ format.
/// Returns (obj_content, mtl_content) as strings. The MTL references the
/// skin texture as `<name>_skin.png`.
pub fn export_obj(model: &Model, name: &str) -> Result<(String, String)> {
    if model.is_empty() {
        return Err(SkinError::Export("Cannot export empty model".to_string()));
    }

    // (group name, layer, mesh) per shell, in model order
    let shells: Vec<_> = model
        .parts
        .iter()
        .flat_map(|part| {
            part.meshes().map(move |box_mesh| {
                let group = match box_mesh.layer {
                    Layer::Base => group_name(&part.name),
                    Layer::Overlay => format!("{}_overlay", group_name(&part.name)),
                };
                (group, box_mesh.layer, box_to_mesh(box_mesh, &part.transform))
            })
        })
        .collect();

    let total_verts: usize = shells.iter().map(|(_, _, m)| m.vertex_count()).sum();
    let total_tris: usize = shells.iter().map(|(_, _, m)| m.triangle_count()).sum();

    // Pre-size buffers: ~60 bytes per vertex line (v/vt/vn) × 3 + ~40 per face
    let mut obj = String::with_capacity(256 + total_verts * 180 + total_tris * 40);
    let mut mtl = String::with_capacity(512);

    // OBJ header
    writeln!(obj, "# Skin Mesher OBJ Export").unwrap();
    writeln!(obj, "# Vertices: {}", total_verts).unwrap();
    writeln!(obj, "# Triangles: {}", total_tris).unwrap();
    writeln!(obj).unwrap();

    writeln!(obj, "mtllib {}.mtl", name).unwrap();
    writeln!(obj).unwrap();
    writeln!(obj, "o {}", name).unwrap();
    writeln!(obj).unwrap();

    // OBJ has global pools, so all vertices go first
    for (_, _, mesh) in &shells {
        for vertex in &mesh.vertices {
            writeln!(
                obj,
                "v {} {} {}",
                vertex.position[0], vertex.position[1], vertex.position[2]
            )
            .unwrap();
        }
    }
    writeln!(obj).unwrap();

    for (_, _, mesh) in &shells {
        for vertex in &mesh.vertices {
            writeln!(obj, "vt {} {}", vertex.uv[0], vertex.uv[1]).unwrap();
        }
    }
    writeln!(obj).unwrap();

    for (_, _, mesh) in &shells {
        for vertex in &mesh.vertices {
            writeln!(
                obj,
                "vn {} {} {}",
                vertex.normal[0], vertex.normal[1], vertex.normal[2]
            )
            .unwrap();
        }
    }

    let mut vertex_offset: usize = 0;
    for (group, layer, mesh) in &shells {
        writeln!(obj).unwrap();
        writeln!(obj, "g {}", group).unwrap();
        writeln!(obj, "usemtl {}_{}", name, layer_suffix(*layer)).unwrap();
        for tri in mesh.indices.chunks(3) {
            let i0 = tri[0] as usize + vertex_offset + 1;
            let i1 = tri[1] as usize + vertex_offset + 1;
            let i2 = tri[2] as usize + vertex_offset + 1;
            writeln!(
                obj,
                "f {}/{}/{} {}/{}/{} {}/{}/{}",
                i0, i0, i0, i1, i1, i1, i2, i2, i2
            )
            .unwrap();
        }
        vertex_offset += mesh.vertex_count();
    }

    // MTL file. Both layers read the same texture and cut out via its alpha.
    writeln!(mtl, "# Skin Mesher Material").unwrap();
    for layer in [Layer::Base, Layer::Overlay] {
        writeln!(mtl).unwrap();
        writeln!(mtl, "newmtl {}_{}", name, layer_suffix(layer)).unwrap();
        writeln!(mtl, "Ka 1.0 1.0 1.0").unwrap();
        writeln!(mtl, "Kd 1.0 1.0 1.0").unwrap();
        writeln!(mtl, "Ks 0.0 0.0 0.0").unwrap();
        writeln!(mtl, "Ns 10.0").unwrap();
        writeln!(mtl, "d 1.0").unwrap();
        writeln!(mtl, "illum 1").unwrap();
        writeln!(mtl, "map_Kd {}_skin.png", name).unwrap();
        writeln!(mtl, "map_d {}_skin.png", name).unwrap();
    }

    Ok((obj, mtl))
}

fn layer_suffix(layer: Layer) -> &'static str {
    match layer {
        Layer::Base => "base",
        Layer::Overlay => "overlay",
    }
}

/// OBJ group names cannot contain whitespace.
fn group_name(part: &str) -> String {
    part.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Export model and skin to OBJ format bytes for writing to files.
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
    pub texture_png: Vec<u8>,
}

impl ObjExport {
    pub fn from_model(model: &Model, atlas: &SkinAtlas, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(model, name)?;
        let texture_png = atlas.to_png()?;
        Ok(Self {
            obj,
            mtl,
            texture_png,
        })
    }

    /// File name the MTL expects the texture under.
    pub fn texture_filename(name: &str) -> String {
        format!("{}_skin.png", name)
    }
}
