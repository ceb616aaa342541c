use std::path::{Path, PathBuf};

use crate::{
    assets::decode::{RasterImage, decode_any},
    foundation::{
        core::Edges,
        error::{PhotoGridError, PhotoGridResult},
    },
    render::compositor::BackgroundPaint,
    template::catalog::{BackgroundSource, PresetEntry},
};

/// Supplies raw bytes for a template or background URL.
///
/// Fetchers may be called from several threads at once.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> PhotoGridResult<Vec<u8>>;
}

/// Reads catalog-relative paths below a root directory.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Fetcher rooted at the directory holding `catalog_path`.
    pub fn for_catalog(catalog_path: &Path) -> Self {
        Self::new(catalog_path.parent().unwrap_or_else(|| Path::new(".")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceFetcher for FsFetcher {
    fn fetch(&self, url: &str) -> PhotoGridResult<Vec<u8>> {
        let norm = normalize_rel_path(url)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            PhotoGridError::template(format!("failed to read '{}': {e}", p.display()))
        })
    }
}

/// Normalize a catalog URL into a relative, forward-slash path without `.` or `..` segments.
pub(crate) fn normalize_rel_path(source: &str) -> PhotoGridResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || s.contains(':') {
        return Err(PhotoGridError::template(format!(
            "template paths must be relative, got '{source}'"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PhotoGridError::template(format!(
                "template paths must not contain '..', got '{source}'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PhotoGridError::template("template path must contain a file name"));
    }
    Ok(out.join("/"))
}

/// Which template the user picked.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateChoice {
    Preset { index: usize, name: String },
    Custom,
}

/// A fully resolved template, swapped into the session as one unit.
#[derive(Clone, Debug)]
pub struct TemplateBundle {
    pub choice: TemplateChoice,
    pub overlay: Option<RasterImage>,
    pub margins: Edges,
    pub padding: Edges,
    /// `Some` when the template controls the background.
    pub background: Option<BackgroundPaint>,
    /// Custom templates let the user edit margins; presets do not.
    pub margins_editable: bool,
}

/// Fetch and decode everything a preset needs.
///
/// Overlay and background are loaded concurrently. The bundle exists only if both succeed.
#[tracing::instrument(level = "debug", skip(entry, fetcher), fields(preset = %entry.name))]
pub fn resolve_preset(
    index: usize,
    entry: &PresetEntry,
    fetcher: &dyn ResourceFetcher,
) -> PhotoGridResult<TemplateBundle> {
    let (overlay, background) = rayon::join(
        || {
            entry
                .url
                .as_deref()
                .map(|url| fetch_raster(fetcher, url, "overlay"))
                .transpose()
        },
        || {
            entry
                .background
                .as_ref()
                .map(|bg| match bg {
                    BackgroundSource::Color { value } => Ok(BackgroundPaint::Color(*value)),
                    BackgroundSource::Image { url } => {
                        fetch_raster(fetcher, url, "background").map(BackgroundPaint::Image)
                    }
                })
                .transpose()
        },
    );
    let overlay = overlay?;
    let background = background?;

    tracing::info!(
        overlay = overlay.is_some(),
        background = background.is_some(),
        "preset resolved"
    );
    Ok(TemplateBundle {
        choice: TemplateChoice::Preset {
            index,
            name: entry.name.clone(),
        },
        overlay,
        margins: entry.margins,
        padding: entry.padding,
        background,
        margins_editable: false,
    })
}

/// Build a custom template from user-supplied overlay bytes (or none).
///
/// Custom templates have zero padding, no background of their own and editable margins.
pub fn resolve_custom(
    overlay: Option<&[u8]>,
    name_hint: Option<&str>,
    margins: Edges,
) -> PhotoGridResult<TemplateBundle> {
    let overlay = overlay
        .map(|bytes| {
            decode_any(bytes, name_hint)
                .map_err(|e| PhotoGridError::template(format!("custom overlay: {e}")))
        })
        .transpose()?;
    Ok(TemplateBundle {
        choice: TemplateChoice::Custom,
        overlay,
        margins,
        padding: Edges::ZERO,
        background: None,
        margins_editable: true,
    })
}

fn fetch_raster(fetcher: &dyn ResourceFetcher, url: &str, what: &str) -> PhotoGridResult<RasterImage> {
    let bytes = fetcher.fetch(url)?;
    decode_any(&bytes, Some(url))
        .map_err(|e| PhotoGridError::template(format!("{what} '{url}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/template/resolve.rs"]
mod tests;
