//! Per-part box mesh descriptors.

use super::unwrap::unwrap_box;
use super::MesherConfig;
use crate::atlas::map_face_to_uv;
use crate::error::Result;
use crate::layout::BodyPartSpec;
use crate::types::{BoundingBox, Face, FaceRect, PartTransform, UvQuad};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which of a part's two shells a mesh belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Base,
    Overlay,
}

/// Render hints handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    /// Texels with alpha below this threshold (0..1) are discarded.
    pub alpha_cutoff: f32,
    /// Render back faces as well.
    pub double_sided: bool,
}

/// One face of a box: where it reads from in the atlas and the UVs for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMapping {
    pub face: Face,
    pub rect: FaceRect,
    pub uv: UvQuad,
}

/// A fully UV-mapped box, centred on its part's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxMesh {
    pub layer: Layer,
    /// Geometric size (width, height, depth), inflation included.
    pub dimensions: [f32; 3],
    /// Six faces in canonical order.
    pub faces: [FaceMapping; 6],
    pub material: SurfaceMaterial,
}

impl BoxMesh {
    pub fn face(&self, face: Face) -> &FaceMapping {
        &self.faces[face.index()]
    }

    pub fn half_extents(&self) -> [f32; 3] {
        [
            self.dimensions[0] / 2.0,
            self.dimensions[1] / 2.0,
            self.dimensions[2] / 2.0,
        ]
    }

    /// Bounding box after placing the box with `transform`.
    pub fn bounds(&self, transform: &PartTransform) -> BoundingBox {
        let [hx, hy, hz] = self.half_extents();
        let min = transform.apply([-hx, -hy, -hz]);
        let max = transform.apply([hx, hy, hz]);
        BoundingBox::new(min, max)
    }
}

/// One body part: base shell, optional overlay shell, and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPart {
    pub name: String,
    pub base: BoxMesh,
    pub overlay: Option<BoxMesh>,
    pub transform: PartTransform,
}

impl ModelPart {
    /// Iterate the base mesh followed by the overlay, if any.
    pub fn meshes(&self) -> impl Iterator<Item = &BoxMesh> {
        std::iter::once(&self.base).chain(self.overlay.as_ref())
    }
}

/// Build the base and overlay box meshes for one layout entry.
///
/// A face reaching outside the atlas fails with
/// [`SkinError::AtlasLayout`](crate::SkinError::AtlasLayout) naming this
/// part and the face. An out-of-range `config` fails with
/// [`SkinError::InvalidConfig`](crate::SkinError::InvalidConfig).
pub fn generate_part(spec: &BodyPartSpec, config: &MesherConfig) -> Result<ModelPart> {
    config.validate()?;

    let base = build_box(
        &spec.name,
        Layer::Base,
        spec.base_origin,
        spec.dimensions,
        0.0,
        config.base_material(),
    )?;

    let overlay = match spec.overlay_origin {
        Some(origin) if config.include_overlay => Some(build_box(
            &spec.name,
            Layer::Overlay,
            origin,
            spec.dimensions,
            config.overlay_inflation,
            config.overlay_material(),
        )?),
        _ => None,
    };

    debug!(
        part = %spec.name,
        overlay = overlay.is_some(),
        "generated part"
    );

    Ok(ModelPart {
        name: spec.name.clone(),
        base,
        overlay,
        transform: PartTransform::new(spec.offset),
    })
}

/// Unwrap and map one box. The atlas rectangles always use the integral
/// part dimensions; `inflation` only grows the geometry.
fn build_box(
    part: &str,
    layer: Layer,
    origin: [u32; 2],
    dimensions: [u32; 3],
    inflation: f32,
    material: SurfaceMaterial,
) -> Result<BoxMesh> {
    let unwrap = unwrap_box(origin, dimensions).map_err(|e| e.with_part(part))?;

    let mut faces = [FaceMapping {
        face: Face::Right,
        rect: FaceRect::new(0, 0, 0, 0),
        uv: UvQuad { corners: [[0.0; 2]; 4] },
    }; 6];
    for (face, rect) in unwrap.iter() {
        let uv = map_face_to_uv(rect).map_err(|e| e.in_part(part, face))?;
        faces[face.index()] = FaceMapping { face, rect, uv };
    }

    Ok(BoxMesh {
        layer,
        dimensions: [
            dimensions[0] as f32 + inflation,
            dimensions[1] as f32 + inflation,
            dimensions[2] as f32 + inflation,
        ],
        faces,
        material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkinError;
    use crate::layout::SkinLayout;

    fn head() -> BodyPartSpec {
        SkinLayout::classic().part("Head").unwrap().clone()
    }

    #[test]
    fn test_head_front_mapping() {
        let part = generate_part(&head(), &MesherConfig::default()).unwrap();
        let front = part.base.face(Face::Front);
        assert_eq!(front.rect, FaceRect::new(8, 8, 8, 8));
        assert_eq!(front.uv.u0(), 0.125);
        assert_eq!(front.uv.u1(), 0.25);
        assert_eq!(front.uv.v0(), 0.75);
        assert_eq!(front.uv.v1(), 0.875);
    }

    #[test]
    fn test_base_material() {
        let part = generate_part(&head(), &MesherConfig::default()).unwrap();
        assert_eq!(part.base.layer, Layer::Base);
        assert_eq!(part.base.dimensions, [8.0, 8.0, 8.0]);
        assert_eq!(part.base.material.alpha_cutoff, 0.5);
        assert!(!part.base.material.double_sided);
        assert_eq!(part.transform.translation, [0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_overlay_is_inflated_and_double_sided() {
        let part = generate_part(&head(), &MesherConfig::default()).unwrap();
        let overlay = part.overlay.as_ref().unwrap();
        assert_eq!(overlay.layer, Layer::Overlay);
        assert_eq!(overlay.dimensions, [8.5, 8.5, 8.5]);
        assert_eq!(overlay.material.alpha_cutoff, 0.1);
        assert!(overlay.material.double_sided);

        // Hat reads from its own cross at (32, 0) with whole-texel rects
        assert_eq!(overlay.face(Face::Front).rect, FaceRect::new(40, 8, 8, 8));

        // Overlay shell encloses the base shell
        let base_bounds = part.base.bounds(&part.transform);
        let overlay_bounds = overlay.bounds(&part.transform);
        assert!(overlay_bounds.contains(&base_bounds));
        assert_ne!(overlay_bounds, base_bounds);
    }

    #[test]
    fn test_no_overlay_origin() {
        let spec = BodyPartSpec::new("Block", [4, 4, 4], [0, 0]);
        let part = generate_part(&spec, &MesherConfig::default()).unwrap();
        assert!(part.overlay.is_none());
        assert_eq!(part.meshes().count(), 1);
    }

    #[test]
    fn test_overlay_disabled_by_config() {
        let config = MesherConfig::default().with_overlay(false);
        let part = generate_part(&head(), &config).unwrap();
        assert!(part.overlay.is_none());
    }

    #[test]
    fn test_faces_in_canonical_order() {
        let part = generate_part(&head(), &MesherConfig::default()).unwrap();
        let faces: Vec<_> = part.base.faces.iter().map(|f| f.face).collect();
        assert_eq!(faces, Face::ALL);
    }

    #[test]
    fn test_out_of_atlas_part_names_part_and_face() {
        // Back face starts at u = 40 + 8 + 8 + 8 = 64
        let spec = BodyPartSpec::new("Wide", [8, 8, 8], [40, 0]);
        let err = generate_part(&spec, &MesherConfig::default()).unwrap_err();
        match err {
            SkinError::AtlasLayout { part, face, rect } => {
                assert_eq!(part.as_deref(), Some("Wide"));
                assert_eq!(face, Some(Face::Back));
                assert_eq!(rect, FaceRect::new(64, 8, 8, 8));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overlay_out_of_atlas_fails_whole_part() {
        let spec = BodyPartSpec::new("Arm", [4, 12, 4], [0, 16]).with_overlay([48, 56]);
        assert!(matches!(
            generate_part(&spec, &MesherConfig::default()),
            Err(SkinError::AtlasLayout { .. })
        ));
    }

    #[test]
    fn test_box_past_texel_range_is_a_layout_error() {
        let spec = BodyPartSpec::new("Huge", [u32::MAX, 1, 1], [0, 0]);
        let err = generate_part(&spec, &MesherConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SkinError::AtlasLayout { part: Some(ref p), face: Some(Face::Right), .. } if p == "Huge"
        ));

        let spec = BodyPartSpec::new("Far", [1, 1, 1], [u32::MAX, u32::MAX]);
        assert!(matches!(
            generate_part(&spec, &MesherConfig::default()),
            Err(SkinError::AtlasLayout { part: Some(_), .. })
        ));
    }

    #[test]
    fn test_non_positive_inflation_rejected() {
        for inflation in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = MesherConfig::default().with_inflation(inflation);
            let err = generate_part(&head(), &config).unwrap_err();
            assert!(matches!(err, SkinError::InvalidConfig(_)), "{inflation}");
        }
    }

    #[test]
    fn test_small_inflation_still_encloses_base() {
        let config = MesherConfig::default().with_inflation(0.01);
        let part = generate_part(&head(), &config).unwrap();
        let overlay = part.overlay.as_ref().unwrap();
        assert!(overlay.bounds(&part.transform).contains(&part.base.bounds(&part.transform)));
        assert_ne!(overlay.bounds(&part.transform), part.base.bounds(&part.transform));
    }
}
