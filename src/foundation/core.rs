use crate::foundation::error::{PhotoGridError, PhotoGridResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Used when neither an overlay nor a background image provides a natural size.
    pub const FALLBACK: Canvas = Canvas {
        width: 1000,
        height: 1000,
    };

    /// Largest edge the raster backend can allocate.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    pub fn new(width: u32, height: u32) -> PhotoGridResult<Self> {
        if width == 0 || height == 0 {
            return Err(PhotoGridError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(PhotoGridError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = Self::MAX_DIM
            )));
        }
        Ok(Self { width, height })
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Four-sided pixel spacing, used both for grid margins and per-cell padding.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Edges {
    #[serde(default)]
    pub top: u32,
    #[serde(default)]
    pub bottom: u32,
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub right: u32,
}

/// Border between the canvas edge and the photo grid.
pub type Margins = Edges;

/// Inset between a grid cell's boundary and the photo drawn inside it.
pub type Padding = Edges;

impl Edges {
    pub const ZERO: Edges = Edges {
        top: 0,
        bottom: 0,
        left: 0,
        right: 0,
    };

    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn uniform(v: u32) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn horizontal(self) -> f64 {
        f64::from(self.left) + f64::from(self.right)
    }

    pub fn vertical(self) -> f64 {
        f64::from(self.top) + f64::from(self.bottom)
    }
}

/// Per-slot pan/zoom controlling which part of a photo is visible inside its cell.
///
/// `scale` is a zoom factor on top of the cover fit (1 = no zoom). `pan_x`/`pan_y` are
/// percentages: 0 aligns the photo's left/top edge with the cell, 100 its right/bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoTransform {
    #[serde(default = "one")]
    pub scale: f64,
    #[serde(default = "fifty")]
    pub pan_x: f64,
    #[serde(default = "fifty")]
    pub pan_y: f64,
}

fn one() -> f64 {
    1.0
}

fn fifty() -> f64 {
    50.0
}

impl Default for PhotoTransform {
    fn default() -> Self {
        Self::CENTERED
    }
}

impl PhotoTransform {
    pub const CENTERED: PhotoTransform = PhotoTransform {
        scale: 1.0,
        pan_x: 50.0,
        pan_y: 50.0,
    };

    pub const PAN_MIN: f64 = 0.0;
    pub const PAN_MAX: f64 = 100.0;

    pub fn new(scale: f64, pan_x: f64, pan_y: f64) -> Self {
        Self {
            scale,
            pan_x,
            pan_y,
        }
    }

    /// Bring every field into its valid range; non-finite values fall back to the centered
    /// defaults.
    pub fn clamped(self) -> Self {
        fn pan(v: f64) -> f64 {
            if v.is_finite() {
                v.clamp(PhotoTransform::PAN_MIN, PhotoTransform::PAN_MAX)
            } else {
                50.0
            }
        }

        Self {
            scale: if self.scale.is_finite() {
                self.scale.max(1.0)
            } else {
                1.0
            },
            pan_x: pan(self.pan_x),
            pan_y: pan(self.pan_y),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
