//! Atlas rectangle to UV quad mapping.
//!
//! Skins are authored with the texel origin at the top-left, while mesh UV
//! space has its origin at the bottom-left, so V is flipped here:
//!
//! ```text
//! atlas (top-left)          uv (bottom-left)
//! v      ┌────────┐         v1 = (64 - v) / 64
//!        │  rect  │
//! v + h  └────────┘         v0 = (64 - (v + h)) / 64
//! ```

use super::ATLAS_SIZE;
use crate::error::{Result, SkinError};
use crate::types::{FaceRect, UvQuad};

/// Map an atlas rectangle to a normalized UV quad.
///
/// Fails with [`SkinError::AtlasLayout`] if the rectangle is empty or
/// reaches past the atlas edge.
pub fn map_face_to_uv(rect: FaceRect) -> Result<UvQuad> {
    let (right, bottom) = match (rect.right(), rect.bottom()) {
        (Some(right), Some(bottom))
            if !rect.is_empty() && right <= ATLAS_SIZE && bottom <= ATLAS_SIZE =>
        {
            (right, bottom)
        }
        _ => {
            return Err(SkinError::AtlasLayout {
                part: None,
                face: None,
                rect,
            })
        }
    };

    let size = ATLAS_SIZE as f32;
    let u0 = rect.u as f32 / size;
    let u1 = right as f32 / size;
    let v0 = (ATLAS_SIZE - bottom) as f32 / size;
    let v1 = (ATLAS_SIZE - rect.v) as f32 / size;

    Ok(UvQuad::from_bounds(u0, v0, u1, v1))
}
