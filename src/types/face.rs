//! Box face identifiers in canonical order.

use serde::{Deserialize, Serialize};

/// One of the six faces of an axis-aligned box.
///
/// The model faces +Z, so `Right` (+X) is the viewer's right and the
/// character's left when seen from the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// +X
    Right,
    /// -X
    Left,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +Z
    Front,
    /// -Z
    Back,
}

impl Face {
    /// All six faces in canonical order {+x, -x, +y, -y, +z, -z}.
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
    ];

    /// Position of this face in the canonical order.
    pub fn index(&self) -> usize {
        match self {
            Face::Right => 0,
            Face::Left => 1,
            Face::Top => 2,
            Face::Bottom => 3,
            Face::Front => 4,
            Face::Back => 5,
        }
    }

    /// Get the outward normal vector for this face.
    pub fn normal(&self) -> [f32; 3] {
        match self {
            Face::Right => [1.0, 0.0, 0.0],
            Face::Left => [-1.0, 0.0, 0.0],
            Face::Top => [0.0, 1.0, 0.0],
            Face::Bottom => [0.0, -1.0, 0.0],
            Face::Front => [0.0, 0.0, 1.0],
            Face::Back => [0.0, 0.0, -1.0],
        }
    }

    /// Corner signs of this face on a unit box, in the box primitive's
    /// per-face vertex order: top-left, top-right, bottom-left, bottom-right
    /// (as seen from outside the box).
    ///
    /// Multiply component-wise by the half extents to get positions.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        match self {
            Face::Right => [
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
                [1.0, -1.0, 1.0],
                [1.0, -1.0, -1.0],
            ],
            Face::Left => [
                [-1.0, 1.0, -1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, -1.0, -1.0],
                [-1.0, -1.0, 1.0],
            ],
            Face::Top => [
                [-1.0, 1.0, -1.0],
                [1.0, 1.0, -1.0],
                [-1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
            Face::Bottom => [
                [-1.0, -1.0, 1.0],
                [1.0, -1.0, 1.0],
                [-1.0, -1.0, -1.0],
                [1.0, -1.0, -1.0],
            ],
            Face::Front => [
                [-1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [-1.0, -1.0, 1.0],
                [1.0, -1.0, 1.0],
            ],
            Face::Back => [
                [1.0, 1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [1.0, -1.0, -1.0],
                [-1.0, -1.0, -1.0],
            ],
        }
    }

    /// Lowercase name, as used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Face::Right => "right",
            Face::Left => "left",
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Front => "front",
            Face::Back => "back",
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
