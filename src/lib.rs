//! # Skin Mesher
//!
//! A Rust library for turning 64×64 player skin atlases into UV-mapped
//! humanoid box models.
//!
//! ## Overview
//!
//! Each body part is an axis-aligned box whose six faces are cut from a
//! fixed "cross" in the atlas. Parts with a second layer get an overlay
//! shell, slightly inflated so it renders just outside the base shell.
//! The result can be exported as GLB, OBJ/MTL or JSON.
//!
//! ## Quick Start
//!
//! ```ignore
//! use skin_mesher::{load_atlas, SkinLayout, SkinMesher, export_glb};
//!
//! let atlas = load_atlas("steve.png")?;
//!
//! let mut mesher = SkinMesher::new(SkinLayout::classic());
//! let model = mesher.assemble(&atlas)?;
//!
//! let glb_bytes = export_glb(model, &atlas)?;
//! ```
//!
//! ## Layouts
//!
//! [`SkinLayout::classic`] and [`SkinLayout::slim`] cover the two standard
//! arm widths. Custom tables can be loaded from JSON:
//!
//! ```ignore
//! let layout = SkinLayout::from_json(r#"{ "parts": [
//!     { "name": "Cube", "dimensions": [8, 8, 8], "base_origin": [0, 0] }
//! ] }"#)?;
//! ```

pub mod error;
pub mod types;
pub mod atlas;
pub mod layout;
pub mod mesher;
pub mod export;

// Re-export main types for convenience
pub use error::{Result, SkinError};
pub use types::{BoundingBox, Face, FaceRect, PartTransform, UvQuad};
pub use atlas::{map_face_to_uv, SkinAtlas, ATLAS_SIZE};
pub use layout::{ArmStyle, BodyPartSpec, SkinLayout};
pub use mesher::{
    assemble, generate_part, unwrap_box, BoxMesh, Layer, Mesh, MesherConfig, Model, ModelPart,
    SkinMesher, SurfaceMaterial, Vertex,
};
pub use export::gltf::export_glb;
pub use export::json::export_json;
pub use export::obj::{export_obj, ObjExport};
pub use export::raw::{export_raw, RawMeshData};

/// Load a skin atlas from a PNG file.
pub fn load_atlas<P: AsRef<std::path::Path>>(path: P) -> Result<SkinAtlas> {
    SkinAtlas::open(path)
}

/// Load a skin atlas from encoded bytes (for WASM compatibility).
pub fn load_atlas_from_bytes(data: &[u8]) -> Result<SkinAtlas> {
    SkinAtlas::from_bytes(data)
}

#[cfg(feature = "wasm")]
pub mod wasm;
