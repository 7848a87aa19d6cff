//! Humanoid layout tables.
//!
//! A [`SkinLayout`] lists every body part with its box dimensions, atlas
//! origins and skeletal offset. The built-in tables describe the standard
//! 64x64 player skin; alternate skeletons can be loaded from JSON without
//! touching the unwrap or mapping code.
//!
//! Left and right are anatomical: the model faces +Z, so the character's
//! right arm sits at -X.

use crate::atlas::ATLAS_SIZE;
use crate::error::{Result, SkinError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One body part of the layout table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartSpec {
    /// Display name, e.g. "Right Arm".
    pub name: String,
    /// Box size (width, height, depth) in scene units, one unit per texel.
    pub dimensions: [u32; 3],
    /// Atlas anchor (u, v) of the base layer's unwrap cross.
    pub base_origin: [u32; 2],
    /// Atlas anchor of the overlay layer, if the part has one.
    #[serde(default)]
    pub overlay_origin: Option<[u32; 2]>,
    /// Translation of the part's centre from the model origin.
    #[serde(default)]
    pub offset: [f32; 3],
}

impl BodyPartSpec {
    pub fn new(name: impl Into<String>, dimensions: [u32; 3], base_origin: [u32; 2]) -> Self {
        Self {
            name: name.into(),
            dimensions,
            base_origin,
            overlay_origin: None,
            offset: [0.0, 0.0, 0.0],
        }
    }

    pub fn with_overlay(mut self, origin: [u32; 2]) -> Self {
        self.overlay_origin = Some(origin);
        self
    }

    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }
}

/// Which built-in arm width to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmStyle {
    /// 4-texel arms ("Steve").
    #[default]
    Classic,
    /// 3-texel arms ("Alex").
    Slim,
}

/// Ordered table of body parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinLayout {
    parts: Vec<BodyPartSpec>,
}

impl SkinLayout {
    /// Build a layout from a list of parts, validating it first.
    pub fn new(parts: Vec<BodyPartSpec>) -> Result<Self> {
        let layout = Self { parts };
        layout.validate()?;
        Ok(layout)
    }

    /// The standard humanoid with 4-texel arms.
    pub fn classic() -> Self {
        Self::humanoid(ArmStyle::Classic)
    }

    /// The standard humanoid with 3-texel arms.
    pub fn slim() -> Self {
        Self::humanoid(ArmStyle::Slim)
    }

    /// The standard humanoid for the given arm style.
    ///
    /// Offsets follow from half-extents: the head sits at body half-height
    /// plus head half-height, arms at body half-width plus arm half-width,
    /// legs at body half-height plus leg half-height below.
    pub fn humanoid(arms: ArmStyle) -> Self {
        let arm_width: u32 = match arms {
            ArmStyle::Classic => 4,
            ArmStyle::Slim => 3,
        };
        let arm_x = 4.0 + arm_width as f32 / 2.0;

        Self {
            parts: vec![
                BodyPartSpec::new("Head", [8, 8, 8], [0, 0])
                    .with_overlay([32, 0])
                    .with_offset([0.0, 10.0, 0.0]),
                BodyPartSpec::new("Body", [8, 12, 4], [16, 16])
                    .with_overlay([16, 32])
                    .with_offset([0.0, 0.0, 0.0]),
                BodyPartSpec::new("Right Arm", [arm_width, 12, 4], [40, 16])
                    .with_overlay([40, 32])
                    .with_offset([-arm_x, 0.0, 0.0]),
                BodyPartSpec::new("Left Arm", [arm_width, 12, 4], [32, 48])
                    .with_overlay([48, 48])
                    .with_offset([arm_x, 0.0, 0.0]),
                BodyPartSpec::new("Right Leg", [4, 12, 4], [0, 16])
                    .with_overlay([0, 32])
                    .with_offset([-2.0, -12.0, 0.0]),
                BodyPartSpec::new("Left Leg", [4, 12, 4], [16, 48])
                    .with_overlay([0, 48])
                    .with_offset([2.0, -12.0, 0.0]),
            ],
        }
    }

    /// Parse a layout from JSON.
    ///
    /// Accepts either `{"parts": [...]}` or a bare array of parts.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LayoutFile {
            Table { parts: Vec<BodyPartSpec> },
            Bare(Vec<BodyPartSpec>),
        }

        let parts = match serde_json::from_str::<LayoutFile>(json)? {
            LayoutFile::Table { parts } => parts,
            LayoutFile::Bare(parts) => parts,
        };
        Self::new(parts)
    }

    /// Load a layout from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the layout as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn parts(&self) -> &[BodyPartSpec] {
        &self.parts
    }

    /// Find a part by name (case-insensitive).
    pub fn part(&self, name: &str) -> Option<&BodyPartSpec> {
        self.parts.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check structural sanity of the table.
    ///
    /// Atlas bounds are not checked here; a part reaching past the atlas
    /// fails at assembly time with the offending face.
    pub fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(SkinError::InvalidLayout("layout has no parts".to_string()));
        }

        let mut seen = HashSet::new();
        for part in &self.parts {
            if part.name.trim().is_empty() {
                return Err(SkinError::InvalidLayout("part with empty name".to_string()));
            }
            if !seen.insert(part.name.to_lowercase()) {
                return Err(SkinError::InvalidLayout(format!(
                    "duplicate part name '{}'",
                    part.name
                )));
            }
            if part.dimensions.iter().any(|&d| d == 0 || d > ATLAS_SIZE) {
                return Err(SkinError::InvalidLayout(format!(
                    "part '{}' has dimensions {:?}; each must be in 1..={}",
                    part.name, part.dimensions, ATLAS_SIZE
                )));
            }
            let origins = std::iter::once(part.base_origin).chain(part.overlay_origin);
            for origin in origins {
                if origin.iter().any(|&o| o >= ATLAS_SIZE) {
                    return Err(SkinError::InvalidLayout(format!(
                        "part '{}' has atlas origin {:?} outside the atlas",
                        part.name, origin
                    )));
                }
            }
            if part.offset.iter().any(|o| !o.is_finite()) {
                return Err(SkinError::InvalidLayout(format!(
                    "part '{}' has a non-finite offset",
                    part.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for SkinLayout {
    fn default() -> Self {
        Self::classic()
    }
}
