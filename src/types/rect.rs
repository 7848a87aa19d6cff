//! Atlas rectangles and normalized UV quads.

use serde::{Deserialize, Serialize};

/// A rectangle in atlas texel coordinates, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceRect {
    pub u: u32,
    pub v: u32,
    pub w: u32,
    pub h: u32,
}

impl FaceRect {
    pub fn new(u: u32, v: u32, w: u32, h: u32) -> Self {
        Self { u, v, w, h }
    }

    /// Exclusive right edge, `None` if it does not fit in a `u32`.
    pub fn right(&self) -> Option<u32> {
        self.u.checked_add(self.w)
    }

    /// Exclusive bottom edge, `None` if it does not fit in a `u32`.
    pub fn bottom(&self) -> Option<u32> {
        self.v.checked_add(self.h)
    }

    /// Area in texels.
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Check whether the rectangle fits an atlas of the given size.
    pub fn fits_within(&self, size: u32) -> bool {
        matches!(self.right(), Some(r) if r <= size) && matches!(self.bottom(), Some(b) if b <= size)
    }

    /// Check whether two rectangles share any texel. An edge past `u32::MAX`
    /// counts as unbounded.
    pub fn overlaps(&self, other: &FaceRect) -> bool {
        let before = |start: u32, end: Option<u32>| end.map_or(true, |end| start < end);
        before(self.u, other.right())
            && before(other.u, self.right())
            && before(self.v, other.bottom())
            && before(other.v, self.bottom())
    }
}

impl std::fmt::Display for FaceRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.u, self.v, self.w, self.h)
    }
}

/// Normalized UV coordinates for one box face, origin at the bottom-left.
///
/// Corners are stored in the box primitive's per-face vertex order:
/// top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvQuad {
    pub corners: [[f32; 2]; 4],
}

impl UvQuad {
    /// Build the quad from its horizontal and vertical extents.
    pub fn from_bounds(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self {
            corners: [[u0, v1], [u1, v1], [u0, v0], [u1, v0]],
        }
    }

    pub fn top_left(&self) -> [f32; 2] {
        self.corners[0]
    }

    pub fn top_right(&self) -> [f32; 2] {
        self.corners[1]
    }

    pub fn bottom_left(&self) -> [f32; 2] {
        self.corners[2]
    }

    pub fn bottom_right(&self) -> [f32; 2] {
        self.corners[3]
    }

    /// Left edge.
    pub fn u0(&self) -> f32 {
        self.corners[2][0]
    }

    /// Right edge.
    pub fn u1(&self) -> f32 {
        self.corners[1][0]
    }

    /// Bottom edge.
    pub fn v0(&self) -> f32 {
        self.corners[2][1]
    }

    /// Top edge.
    pub fn v1(&self) -> f32 {
        self.corners[0][1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = FaceRect::new(8, 8, 8, 12);
        assert_eq!(rect.right(), Some(16));
        assert_eq!(rect.bottom(), Some(20));
        assert_eq!(rect.area(), 96);
        assert!(rect.fits_within(64));
        assert!(!FaceRect::new(60, 0, 8, 8).fits_within(64));
    }

    #[test]
    fn test_rect_edges_past_u32_range() {
        let rect = FaceRect::new(u32::MAX, 0, 1, 1);
        assert_eq!(rect.right(), None);
        assert!(!rect.fits_within(64));
        assert!(!FaceRect::new(0, 1, 1, u32::MAX).fits_within(64));
        assert_eq!(FaceRect::new(0, 0, u32::MAX, u32::MAX).area(), (u32::MAX as u64).pow(2));
        assert!(rect.overlaps(&FaceRect::new(u32::MAX - 1, 0, 4, 4)));
    }

    #[test]
    fn test_rect_overlap() {
        let a = FaceRect::new(0, 0, 8, 8);
        assert!(a.overlaps(&FaceRect::new(4, 4, 8, 8)));
        // Touching edges do not share texels
        assert!(!a.overlaps(&FaceRect::new(8, 0, 8, 8)));
        assert!(!a.overlaps(&FaceRect::new(0, 8, 8, 8)));
    }

    #[test]
    fn test_uv_quad_corner_order() {
        let quad = UvQuad::from_bounds(0.1, 0.2, 0.3, 0.4);
        assert_eq!(quad.top_left(), [0.1, 0.4]);
        assert_eq!(quad.top_right(), [0.3, 0.4]);
        assert_eq!(quad.bottom_left(), [0.1, 0.2]);
        assert_eq!(quad.bottom_right(), [0.3, 0.2]);
        assert_eq!((quad.u0(), quad.v0(), quad.u1(), quad.v1()), (0.1, 0.2, 0.3, 0.4));
    }
}
