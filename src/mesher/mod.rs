//! Model assembly from a skin atlas.
//!
//! This module turns a validated atlas and a layout table into positioned,
//! UV-mapped box meshes.

pub mod geometry;
pub mod part;
pub mod unwrap;

pub use geometry::{box_to_mesh, Mesh, Vertex};
pub use part::{generate_part, BoxMesh, FaceMapping, Layer, ModelPart, SurfaceMaterial};
pub use unwrap::{surface_area, unwrap_box, BoxUnwrap};

use crate::atlas::{SkinAtlas, ATLAS_SIZE};
use crate::error::{Result, SkinError};
use crate::layout::SkinLayout;
use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main mesher configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MesherConfig {
    /// Amount added to each overlay dimension so the overlay shell clears
    /// the base shell.
    pub overlay_inflation: f32,
    /// Alpha cutoff for base shells.
    pub base_alpha_cutoff: f32,
    /// Alpha cutoff for overlay shells.
    pub overlay_alpha_cutoff: f32,
    /// Generate overlay shells for parts that define one.
    pub include_overlay: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            overlay_inflation: 0.5,
            base_alpha_cutoff: 0.5,
            overlay_alpha_cutoff: 0.1,
            include_overlay: true,
        }
    }
}

impl MesherConfig {
    pub fn with_overlay(mut self, include: bool) -> Self {
        self.include_overlay = include;
        self
    }

    pub fn with_inflation(mut self, inflation: f32) -> Self {
        self.overlay_inflation = inflation;
        self
    }

    pub fn with_alpha_cutoffs(mut self, base: f32, overlay: f32) -> Self {
        self.base_alpha_cutoff = base;
        self.overlay_alpha_cutoff = overlay;
        self
    }

    /// Check that the overlay inflation is a positive finite amount and the
    /// alpha cutoffs lie in 0..=1.
    pub fn validate(&self) -> Result<()> {
        if !(self.overlay_inflation.is_finite() && self.overlay_inflation > 0.0) {
            return Err(SkinError::InvalidConfig(format!(
                "overlay inflation must be a positive finite number, got {}",
                self.overlay_inflation
            )));
        }
        for (name, cutoff) in [
            ("base", self.base_alpha_cutoff),
            ("overlay", self.overlay_alpha_cutoff),
        ] {
            if !(0.0..=1.0).contains(&cutoff) {
                return Err(SkinError::InvalidConfig(format!(
                    "{} alpha cutoff must be within 0..=1, got {}",
                    name, cutoff
                )));
            }
        }
        Ok(())
    }

    /// Material for base shells: single-sided cutout.
    pub fn base_material(&self) -> SurfaceMaterial {
        SurfaceMaterial {
            alpha_cutoff: self.base_alpha_cutoff,
            double_sided: false,
        }
    }

    /// Material for overlay shells: double-sided cutout.
    pub fn overlay_material(&self) -> SurfaceMaterial {
        SurfaceMaterial {
            alpha_cutoff: self.overlay_alpha_cutoff,
            double_sided: true,
        }
    }
}

/// The assembled avatar: one entry per layout part, in layout order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub parts: Vec<ModelPart>,
}

impl Model {
    /// Find a part by name (case-insensitive).
    pub fn part(&self, name: &str) -> Option<&ModelPart> {
        self.parts.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of box meshes, overlays included.
    pub fn box_count(&self) -> usize {
        self.parts.iter().map(|p| p.meshes().count()).sum()
    }

    /// All base shells merged into one world-space mesh.
    pub fn base_mesh(&self) -> Mesh {
        self.layer_mesh(Layer::Base)
    }

    /// All overlay shells merged into one world-space mesh.
    pub fn overlay_mesh(&self) -> Mesh {
        self.layer_mesh(Layer::Overlay)
    }

    fn layer_mesh(&self, layer: Layer) -> Mesh {
        let mut mesh = Mesh::new();
        for part in &self.parts {
            for box_mesh in part.meshes().filter(|m| m.layer == layer) {
                mesh.merge(&box_to_mesh(box_mesh, &part.transform));
            }
        }
        mesh
    }

    /// World-space bounds of every shell.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let corners = self.parts.iter().flat_map(|part| {
            part.meshes().flat_map(move |m| {
                let b = m.bounds(&part.transform);
                [b.min, b.max]
            })
        });
        BoundingBox::from_points(corners)
    }
}

/// Assemble a model for `atlas` from every entry of `layout`.
///
/// All-or-nothing: the first failing part aborts the assembly.
pub fn assemble(layout: &SkinLayout, atlas: &SkinAtlas, config: &MesherConfig) -> Result<Model> {
    if atlas.width() != ATLAS_SIZE || atlas.height() != ATLAS_SIZE {
        return Err(SkinError::AtlasDimension {
            width: atlas.width(),
            height: atlas.height(),
        });
    }
    config.validate()?;

    let parts = layout
        .parts()
        .iter()
        .map(|spec| generate_part(spec, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(Model { parts })
}

/// Stateful assembler.
///
/// Starts empty; each successful assembly replaces the retained model and
/// atlas. A failed assembly leaves the previous state untouched.
#[derive(Debug, Clone)]
pub struct SkinMesher {
    layout: SkinLayout,
    config: MesherConfig,
    current: Option<Loaded>,
}

#[derive(Debug, Clone)]
struct Loaded {
    atlas: SkinAtlas,
    model: Model,
}

impl SkinMesher {
    /// Create a new mesher with default configuration.
    pub fn new(layout: SkinLayout) -> Self {
        Self::with_config(layout, MesherConfig::default())
    }

    /// Create a new mesher with custom configuration.
    pub fn with_config(layout: SkinLayout, config: MesherConfig) -> Self {
        Self {
            layout,
            config,
            current: None,
        }
    }

    pub fn layout(&self) -> &SkinLayout {
        &self.layout
    }

    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// The last successfully assembled model.
    pub fn model(&self) -> Option<&Model> {
        self.current.as_ref().map(|l| &l.model)
    }

    /// The atlas the current model was assembled from.
    pub fn atlas(&self) -> Option<&SkinAtlas> {
        self.current.as_ref().map(|l| &l.atlas)
    }

    pub fn is_populated(&self) -> bool {
        self.current.is_some()
    }

    /// Drop the retained model, returning to the empty state.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Assemble a model for `atlas` and retain it.
    pub fn assemble(&mut self, atlas: &SkinAtlas) -> Result<&Model> {
        let result = assemble(&self.layout, atlas, &self.config);
        self.commit(result.map(|model| Loaded {
            atlas: atlas.clone(),
            model,
        }))
    }

    /// Assemble from a raw RGBA8 buffer.
    pub fn assemble_rgba(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<&Model> {
        let loaded = SkinAtlas::from_rgba(width, height, pixels).and_then(|atlas| {
            let model = assemble(&self.layout, &atlas, &self.config)?;
            Ok(Loaded { atlas, model })
        });
        self.commit(loaded)
    }

    /// Assemble from encoded image bytes. Decode failures are reported like
    /// any other assembly failure.
    pub fn assemble_bytes(&mut self, data: &[u8]) -> Result<&Model> {
        let loaded = SkinAtlas::from_bytes(data).and_then(|atlas| {
            let model = assemble(&self.layout, &atlas, &self.config)?;
            Ok(Loaded { atlas, model })
        });
        self.commit(loaded)
    }

    fn commit(&mut self, loaded: Result<Loaded>) -> Result<&Model> {
        match loaded {
            Ok(loaded) => {
                info!(
                    parts = loaded.model.len(),
                    boxes = loaded.model.box_count(),
                    "assembled skin model"
                );
                Ok(&self.current.insert(loaded).model)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    retained = self.current.is_some(),
                    "skin assembly failed"
                );
                Err(e)
            }
        }
    }
}

impl Default for SkinMesher {
    fn default() -> Self {
        Self::new(SkinLayout::classic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BodyPartSpec;
    use crate::types::Face;

    fn painted_atlas() -> SkinAtlas {
        // Distinct colour per texel so a vertical flip would be caught
        let mut atlas = SkinAtlas::solid([0, 0, 0, 255]);
        for y in 0..64 {
            for x in 0..64 {
                atlas.set_pixel(x, y, [x as u8 * 4, y as u8 * 4, 128, 255]);
            }
        }
        atlas
    }

    #[test]
    fn test_assemble_classic() {
        let model = assemble(
            &SkinLayout::classic(),
            &SkinAtlas::solid([255; 4]),
            &MesherConfig::default(),
        )
        .unwrap();

        assert_eq!(model.len(), 6);
        assert_eq!(model.box_count(), 12);
        let names: Vec<_> = model.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Head", "Body", "Right Arm", "Left Arm", "Right Leg", "Left Leg"]
        );
        assert_eq!(model.part("right arm").unwrap().transform.translation, [-6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let atlas = painted_atlas();
        let png = atlas.to_png().unwrap();

        let layout = SkinLayout::classic();
        let config = MesherConfig::default();

        let first = assemble(&layout, &SkinAtlas::from_bytes(&png).unwrap(), &config).unwrap();
        let second = assemble(&layout, &SkinAtlas::from_bytes(&png).unwrap(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uniform_atlas_samples_single_colour() {
        let colour = [200, 150, 100, 255];
        let atlas = SkinAtlas::solid(colour);
        let model = assemble(&SkinLayout::classic(), &atlas, &MesherConfig::default()).unwrap();

        for part in &model.parts {
            for mesh in part.meshes() {
                for mapping in &mesh.faces {
                    for corner in mapping.uv.corners {
                        assert_eq!(atlas.sample_uv(corner), colour, "{} {}", part.name, mapping.face);
                    }
                }
            }
        }
    }

    #[test]
    fn test_face_corners_sample_inside_their_rect() {
        // Sampling half a texel inside each UV corner must land on the
        // corresponding corner texel of the face's atlas rectangle.
        let atlas = painted_atlas();
        let model = assemble(&SkinLayout::classic(), &atlas, &MesherConfig::default()).unwrap();
        let half = 0.5 / 64.0;

        for part in &model.parts {
            for mesh in part.meshes() {
                for mapping in &mesh.faces {
                    let r = mapping.rect;
                    let uv = mapping.uv;

                    let tl = uv.top_left();
                    assert_eq!(atlas.sample_uv([tl[0] + half, tl[1] - half]), atlas.pixel(r.u, r.v));

                    let br = uv.bottom_right();
                    assert_eq!(
                        atlas.sample_uv([br[0] - half, br[1] + half]),
                        atlas.pixel(r.u + r.w - 1, r.v + r.h - 1)
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_atlas_layout_aborts_assembly() {
        let layout = SkinLayout::new(vec![
            BodyPartSpec::new("Ok", [4, 4, 4], [0, 0]),
            BodyPartSpec::new("Broken", [8, 8, 8], [40, 40]),
        ])
        .unwrap();

        let err = assemble(&layout, &SkinAtlas::solid([0; 4]), &MesherConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SkinError::AtlasLayout { part: Some(ref p), face: Some(Face::Back), .. } if p == "Broken"
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(MesherConfig::default().validate().is_ok());
        assert!(MesherConfig::default().with_inflation(0.01).validate().is_ok());

        for inflation in [0.0, -1.0, f32::NAN, f32::NEG_INFINITY] {
            let config = MesherConfig::default().with_inflation(inflation);
            assert!(matches!(config.validate(), Err(SkinError::InvalidConfig(_))), "{inflation}");
        }
        for (base, overlay) in [(1.5, 0.1), (0.5, -0.1), (f32::NAN, 0.1)] {
            let config = MesherConfig::default().with_alpha_cutoffs(base, overlay);
            assert!(config.validate().is_err(), "{base} {overlay}");
        }
    }

    #[test]
    fn test_invalid_inflation_fails_assembly_and_keeps_state() {
        let atlas = SkinAtlas::solid([0; 4]);
        let err = assemble(
            &SkinLayout::classic(),
            &atlas,
            &MesherConfig::default().with_inflation(-1.0),
        )
        .unwrap_err();
        assert!(matches!(err, SkinError::InvalidConfig(_)));

        let mut mesher = SkinMesher::with_config(
            SkinLayout::classic(),
            MesherConfig::default().with_inflation(f32::NAN),
        );
        assert!(mesher.assemble(&atlas).is_err());
        assert!(!mesher.is_populated());
    }

    #[test]
    fn test_model_bounds() {
        let model = assemble(
            &SkinLayout::classic(),
            &SkinAtlas::solid([0; 4]),
            &MesherConfig::default().with_overlay(false),
        )
        .unwrap();

        let bounds = model.bounds().unwrap();
        // Arms reach x = +-8, head top at y = 14, feet at y = -18
        assert_eq!(bounds.min, [-8.0, -18.0, -4.0]);
        assert_eq!(bounds.max, [8.0, 14.0, 4.0]);
    }

    #[test]
    fn test_layer_meshes() {
        let model = assemble(&SkinLayout::classic(), &SkinAtlas::solid([0; 4]), &MesherConfig::default()).unwrap();
        assert_eq!(model.base_mesh().vertex_count(), 6 * 24);
        assert_eq!(model.overlay_mesh().triangle_count(), 6 * 12);
    }

    #[test]
    fn test_mesher_starts_empty() {
        let mesher = SkinMesher::default();
        assert!(!mesher.is_populated());
        assert!(mesher.model().is_none());
        assert!(mesher.atlas().is_none());
    }

    #[test]
    fn test_mesher_populates_and_replaces() {
        let mut mesher = SkinMesher::default();
        mesher.assemble(&SkinAtlas::solid([1, 1, 1, 255])).unwrap();
        assert!(mesher.is_populated());
        assert_eq!(mesher.atlas().unwrap().pixel(0, 0), [1, 1, 1, 255]);

        mesher.assemble(&SkinAtlas::solid([2, 2, 2, 255])).unwrap();
        assert_eq!(mesher.atlas().unwrap().pixel(0, 0), [2, 2, 2, 255]);

        mesher.clear();
        assert!(!mesher.is_populated());
    }

    #[test]
    fn test_failed_assembly_keeps_previous_model() {
        let mut mesher = SkinMesher::default();
        let previous = mesher.assemble(&SkinAtlas::solid([9, 9, 9, 255])).unwrap().clone();

        let err = mesher.assemble_rgba(32, 32, vec![0; 32 * 32 * 4]).unwrap_err();
        assert!(matches!(err, SkinError::AtlasDimension { width: 32, height: 32 }));
        assert_eq!(mesher.model(), Some(&previous));

        assert!(mesher.assemble_bytes(b"not an image").is_err());
        assert_eq!(mesher.model(), Some(&previous));
        assert_eq!(mesher.atlas().unwrap().pixel(0, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn test_failure_from_empty_stays_empty() {
        let mut mesher = SkinMesher::default();
        assert!(mesher.assemble_rgba(64, 32, vec![0; 64 * 32 * 4]).is_err());
        assert!(!mesher.is_populated());
    }

    #[test]
    fn test_assemble_bytes() {
        let png = SkinAtlas::solid([3, 3, 3, 255]).to_png().unwrap();
        let mut mesher = SkinMesher::new(SkinLayout::slim());
        let model = mesher.assemble_bytes(&png).unwrap();
        assert_eq!(model.part("Left Arm").unwrap().base.dimensions, [3.0, 12.0, 4.0]);
    }
}
