//! Skin atlas handling.
//!
//! This module loads and validates the 64x64 skin atlas and maps
//! atlas-space rectangles into normalized UV space.

pub mod mapper;
mod skin;

pub use mapper::map_face_to_uv;
pub use skin::SkinAtlas;

/// Edge length of a skin atlas in texels.
pub const ATLAS_SIZE: u32 = 64;
