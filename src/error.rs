//! Error types for the skin mesher.

use crate::types::{Face, FaceRect};
use thiserror::Error;

/// Result type alias using SkinError.
pub type Result<T> = std::result::Result<T, SkinError>;

/// Main error type for skin meshing operations.
#[derive(Error, Debug)]
pub enum SkinError {
    /// The atlas is not exactly 64x64 texels.
    #[error("Atlas must be 64x64, got {width}x{height}")]
    AtlasDimension { width: u32, height: u32 },

    /// A face rectangle falls outside the atlas or has zero area.
    #[error("Face rectangle {rect} is outside the 64x64 atlas{}", layout_context(.part, .face))]
    AtlasLayout {
        part: Option<String>,
        face: Option<Face>,
        rect: FaceRect,
    },

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A layout table is malformed.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A mesher setting is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}

impl SkinError {
    /// Attach the offending part and face to an `AtlasLayout` error.
    /// Other variants pass through untouched.
    pub fn in_part(self, name: &str, at: Face) -> Self {
        match self {
            SkinError::AtlasLayout { rect, .. } => SkinError::AtlasLayout {
                part: Some(name.to_string()),
                face: Some(at),
                rect,
            },
            other => other,
        }
    }

    /// Attach the offending part to an `AtlasLayout` error, keeping any
    /// face already recorded.
    pub fn with_part(self, name: &str) -> Self {
        match self {
            SkinError::AtlasLayout { face, rect, .. } => SkinError::AtlasLayout {
                part: Some(name.to_string()),
                face,
                rect,
            },
            other => other,
        }
    }
}

fn layout_context(part: &Option<String>, face: &Option<Face>) -> String {
    match (part, face) {
        (Some(part), Some(face)) => format!(" (part '{}', {} face)", part, face.name()),
        (Some(part), None) => format!(" (part '{}')", part),
        (None, Some(face)) => format!(" ({} face)", face.name()),
        (None, None) => String::new(),
    }
}
