//! Box-UV unwrap.
//!
//! A box of size (W, H, D) anchored at atlas origin (u, v) occupies a
//! fixed "cross" of six rectangles:
//!
//! ```text
//!          u      u+D      u+D+W    u+2D+W   u+2D+2W
//! v        .      | TOP    | BOTTOM |
//! v+D      | LEFT | FRONT  | RIGHT  | BACK    |
//! v+D+H    .      .        .        .         .
//! ```
//!
//! LEFT is the -X face and RIGHT the +X face of a box facing +Z.

use crate::error::{Result, SkinError};
use crate::types::{Face, FaceRect};

/// The six atlas rectangles of one box, in canonical face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxUnwrap {
    rects: [FaceRect; 6],
}

impl BoxUnwrap {
    /// Rectangle for a single face.
    pub fn get(&self, face: Face) -> FaceRect {
        self.rects[face.index()]
    }

    /// Iterate (face, rect) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Face, FaceRect)> + '_ {
        Face::ALL.iter().map(move |&face| (face, self.get(face)))
    }

    /// Sum of the six rectangle areas in texels.
    pub fn total_area(&self) -> u64 {
        self.rects.iter().map(FaceRect::area).sum()
    }
}

/// Derive the six face rectangles of a box from its atlas origin and
/// dimensions (width, height, depth).
///
/// Fails with [`SkinError::AtlasLayout`] for the first face whose corner
/// cannot be represented in texel coordinates. The reported rectangle is
/// anchored at the box origin.
pub fn unwrap_box(origin: [u32; 2], dimensions: [u32; 3]) -> Result<BoxUnwrap> {
    let [u, v] = origin;
    let [w, h, d] = dimensions;

    let mut rects = [FaceRect::new(0, 0, 0, 0); 6];
    for face in Face::ALL {
        // (column offset, row offset, rect width, rect height) from the origin
        let (du, dv, rw, rh) = match face {
            Face::Right => (d.checked_add(w), Some(d), d, h),
            Face::Left => (Some(0), Some(d), d, h),
            Face::Top => (Some(d), Some(0), w, d),
            Face::Bottom => (d.checked_add(w), Some(0), w, d),
            Face::Front => (Some(d), Some(d), w, h),
            Face::Back => (d.checked_add(w).and_then(|x| x.checked_add(d)), Some(d), w, h),
        };

        let corner = du
            .and_then(|du| u.checked_add(du))
            .zip(dv.and_then(|dv| v.checked_add(dv)));
        let (ru, rv) = corner.ok_or(SkinError::AtlasLayout {
            part: None,
            face: Some(face),
            rect: FaceRect::new(u, v, rw, rh),
        })?;
        rects[face.index()] = FaceRect::new(ru, rv, rw, rh);
    }

    Ok(BoxUnwrap { rects })
}

/// Full surface area 2(WD + HD + HW) of a box.
pub fn surface_area(dimensions: [u32; 3]) -> u64 {
    let [w, h, d] = dimensions.map(u64::from);
    2 * (w * d + h * d + h * w)
}
