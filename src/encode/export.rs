use std::{io::Cursor, path::Path};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::{
    foundation::{
        error::{PhotoGridError, PhotoGridResult},
        math::premultiply_rgba8_in_place,
    },
    render::surface::FrameRGBA,
};

/// Quality used for JPEG exports unless the caller overrides it.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Output encoding of an exported frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossy, no alpha. Transparent pixels flatten to black.
    Jpeg { quality: u8 },
    /// Lossless straight-alpha RGBA.
    Png,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportFormat {
    /// Guess the format from a file extension (`jpg`, `jpeg`, `png`; case-insensitive).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::default()),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Parse a format name as accepted on the command line.
    pub fn from_name(name: &str, quality: Option<u8>) -> PhotoGridResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg {
                quality: quality.unwrap_or(DEFAULT_JPEG_QUALITY),
            }),
            "png" => Ok(Self::Png),
            other => Err(PhotoGridError::validation(format!(
                "unknown export format '{other}' (expected jpeg or png)"
            ))),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encode a rendered frame.
pub fn encode_frame(frame: &FrameRGBA, format: ExportFormat) -> PhotoGridResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(PhotoGridError::encode(format!(
            "frame buffer of {} bytes does not match {}x{} RGBA",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut out = Vec::new();
    match format {
        ExportFormat::Jpeg { quality } => {
            let rgb = flatten_on_black(frame);
            let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut out),
                quality.clamp(1, 100),
            );
            enc.encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")
                .map_err(|e| PhotoGridError::encode(format!("{e:#}")))?;
        }
        ExportFormat::Png => {
            let rgba = frame.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
                .write_image(&rgba, frame.width, frame.height, image::ExtendedColorType::Rgba8)
                .context("encode png")
                .map_err(|e| PhotoGridError::encode(format!("{e:#}")))?;
        }
    }
    tracing::debug!(bytes = out.len(), mime = format.mime(), "frame encoded");
    Ok(out)
}

/// Encode `frame` and write it to `path`, creating parent directories.
pub fn write_export(path: &Path, frame: &FrameRGBA, format: ExportFormat) -> PhotoGridResult<()> {
    let bytes = encode_frame(frame, format)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("write export '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(())
}

/// Premultiplied color channels are the pixel composited over black.
fn flatten_on_black(frame: &FrameRGBA) -> Vec<u8> {
    let mut data = std::borrow::Cow::Borrowed(frame.data.as_slice());
    if !frame.premultiplied {
        premultiply_rgba8_in_place(data.to_mut());
    }
    data.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
