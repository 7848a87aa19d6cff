//! Part placement within the humanoid skeleton.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Fixed translation positioning a part relative to the model origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartTransform {
    /// Translation in scene units (one unit per atlas texel).
    pub translation: [f32; 3],
}

impl PartTransform {
    pub fn new(translation: [f32; 3]) -> Self {
        Self { translation }
    }

    /// Check if this is an identity transform (no translation).
    pub fn is_identity(&self) -> bool {
        self.translation == [0.0, 0.0, 0.0]
    }

    /// Transform matrix for this placement.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.translation))
    }

    /// Apply the placement to a point in part-local space.
    pub fn apply(&self, point: [f32; 3]) -> [f32; 3] {
        self.matrix().transform_point3(Vec3::from_array(point)).to_array()
    }
}
