use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::Context;

use crate::{
    assets::color::Color,
    foundation::error::{PhotoGridError, PhotoGridResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Avoid pathological allocations from hostile or broken SVG headers.
const MAX_SVG_DIM: u32 = 16_384;

/// Process-unique identity of a decoded raster.
///
/// Cloning a [`RasterImage`] keeps its id, so two handles with the same id always carry the same
/// pixels. Paint caches and state fingerprints key on it instead of hashing pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RasterId(u64);

impl RasterId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct RasterImage {
    id: RasterId,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl RasterImage {
    /// Wrap premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> PhotoGridResult<Self> {
        if width == 0 || height == 0 {
            return Err(PhotoGridError::decode(format!(
                "raster must be non-empty, got {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PhotoGridError::decode("raster size overflow"))?;
        if data.len() != expected {
            return Err(PhotoGridError::decode(format!(
                "raster byte length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            id: RasterId::next(),
            width,
            height,
            rgba8_premul: Arc::new(data),
        })
    }

    /// Wrap straight RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> PhotoGridResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// A raster filled with a single color.
    pub fn solid(width: u32, height: u32, color: Color) -> PhotoGridResult<Self> {
        let px = color.to_premul();
        let count = (width as usize).saturating_mul(height as usize);
        let data = px.iter().copied().cycle().take(count * 4).collect();
        Self::from_premul_rgba8(width, height, data)
    }

    pub fn id(&self) -> RasterId {
        self.id
    }

    /// Straight-alpha RGBA8 of the pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.rgba8_premul[i..i + 4]);
        crate::foundation::math::unpremultiply_rgba8_in_place(&mut px);
        Some(px)
    }
}

/// Decode encoded raster bytes (PNG, JPEG, GIF, WebP, ...) to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PhotoGridResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| PhotoGridError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes and rasterize them at the document's natural size.
pub fn decode_svg(bytes: &[u8]) -> PhotoGridResult<RasterImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| PhotoGridError::decode(format!("{e:#}")))?;

    fn to_px(v: f32) -> PhotoGridResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PhotoGridError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(PhotoGridError::decode(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PhotoGridError::decode("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied RGBA8.
    RasterImage::from_premul_rgba8(width, height, pixmap.take())
}

/// Decode bytes as SVG when they look like one, otherwise as a bitmap.
pub fn decode_any(bytes: &[u8], name_hint: Option<&str>) -> PhotoGridResult<RasterImage> {
    if looks_like_svg(bytes, name_hint) {
        decode_svg(bytes)
    } else {
        decode_image(bytes)
    }
}

/// Read and decode a raster from disk.
pub fn load_raster(path: &Path) -> PhotoGridResult<RasterImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))
        .map_err(|e| PhotoGridError::decode(format!("{e:#}")))?;
    decode_any(&bytes, path.to_str())
}

fn looks_like_svg(bytes: &[u8], name_hint: Option<&str>) -> bool {
    if let Some(name) = name_hint
        && name.to_ascii_lowercase().ends_with(".svg")
    {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
