//! Decoded skin atlas.

use super::ATLAS_SIZE;
use crate::error::{Result, SkinError};
use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use std::path::Path;

/// A validated 64x64 RGBA skin atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinAtlas {
    image: RgbaImage,
}

impl SkinAtlas {
    /// Create an atlas from a decoded image.
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        Self::check_dimensions(image.width(), image.height())?;
        Ok(Self {
            image: image.into_rgba8(),
        })
    }

    /// Create an atlas from a raw RGBA8 buffer (4 bytes per texel, row-major,
    /// top row first).
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::check_dimensions(width, height)?;
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            SkinError::Image(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )))
        })?;
        Ok(Self { image })
    }

    /// Decode an atlas from encoded image bytes (PNG).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)?;
        Self::from_image(image)
    }

    /// Load an atlas from an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Create an atlas filled with a single color.
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(ATLAS_SIZE, ATLAS_SIZE, Rgba(color)),
        }
    }

    fn check_dimensions(width: u32, height: u32) -> Result<()> {
        if width != ATLAS_SIZE || height != ATLAS_SIZE {
            return Err(SkinError::AtlasDimension { width, height });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get a texel at (x, y), top-left origin.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Set a texel at (x, y), top-left origin.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.image.put_pixel(x, y, Rgba(color));
    }

    /// Sample the texel under a normalized UV coordinate (bottom-left
    /// origin), nearest-neighbour with edge clamping.
    pub fn sample_uv(&self, uv: [f32; 2]) -> [u8; 4] {
        let size = ATLAS_SIZE as f32;
        let max = (ATLAS_SIZE - 1) as f32;
        let x = (uv[0] * size).floor().clamp(0.0, max) as u32;
        let y = ((1.0 - uv[1]) * size).floor().clamp(0.0, max) as u32;
        self.pixel(x, y)
    }

    /// Check if any texel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] < 255)
    }

    /// Raw RGBA8 texel data.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Encode the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        use image::ImageEncoder;

        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            self.image.as_raw(),
            self.width(),
            self.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_atlas() {
        let atlas = SkinAtlas::solid([10, 20, 30, 255]);
        assert_eq!(atlas.width(), 64);
        assert_eq!(atlas.height(), 64);
        assert_eq!(atlas.pixel(63, 63), [10, 20, 30, 255]);
        assert!(!atlas.has_transparency());
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let err = SkinAtlas::from_rgba(32, 32, vec![0; 32 * 32 * 4]).unwrap_err();
        assert!(matches!(err, SkinError::AtlasDimension { width: 32, height: 32 }));

        // Legacy 64x32 skins are rejected too
        let legacy = DynamicImage::new_rgba8(64, 32);
        assert!(matches!(
            SkinAtlas::from_image(legacy),
            Err(SkinError::AtlasDimension { width: 64, height: 32 })
        ));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = SkinAtlas::from_rgba(64, 64, vec![0; 16]).unwrap_err();
        assert!(matches!(err, SkinError::Image(_)));
    }

    #[test]
    fn test_sample_uv_flips_v() {
        let mut atlas = SkinAtlas::solid([0, 0, 0, 255]);
        atlas.set_pixel(0, 0, [255, 0, 0, 255]);
        atlas.set_pixel(0, 63, [0, 255, 0, 255]);

        // Top-left texel sits at the top of UV space
        assert_eq!(atlas.sample_uv([0.001, 0.999]), [255, 0, 0, 255]);
        // Bottom-left texel sits at v = 0
        assert_eq!(atlas.sample_uv([0.001, 0.001]), [0, 255, 0, 255]);
        // Edges clamp instead of wrapping
        assert_eq!(atlas.sample_uv([0.0, 1.0]), [255, 0, 0, 255]);
        assert_eq!(atlas.sample_uv([0.0, 0.0]), [0, 255, 0, 255]);
    }

    #[test]
    fn test_png_round_trip() {
        let mut atlas = SkinAtlas::solid([1, 2, 3, 255]);
        atlas.set_pixel(5, 7, [9, 8, 7, 0]);

        let png = atlas.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = SkinAtlas::from_bytes(&png).unwrap();
        assert_eq!(decoded, atlas);
        assert!(decoded.has_transparency());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            SkinAtlas::from_bytes(b"definitely not a png"),
            Err(SkinError::Image(_))
        ));
    }

    #[test]
    fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.png");
        std::fs::write(&path, SkinAtlas::solid([4, 4, 4, 255]).to_png().unwrap()).unwrap();

        let atlas = SkinAtlas::open(&path).unwrap();
        assert_eq!(atlas.pixel(0, 0), [4, 4, 4, 255]);

        assert!(matches!(
            SkinAtlas::open(dir.path().join("missing.png")),
            Err(SkinError::Io(_))
        ));
    }
}
