use std::{fs::File, io::BufReader, path::Path};

use crate::{
    assets::color::Color,
    foundation::{
        core::Edges,
        error::{PhotoGridError, PhotoGridResult},
    },
};

/// Where a preset's background comes from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundSource {
    Color { value: Color },
    Image { url: String },
}

/// One predefined template.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetEntry {
    pub name: String,
    /// Overlay image; `null` for background-only presets.
    #[serde(default)]
    pub url: Option<String>,
    pub margins: Edges,
    #[serde(default)]
    pub padding: Edges,
    /// Absent means the user's manual background stays in charge.
    #[serde(default)]
    pub background: Option<BackgroundSource>,
}

/// How a job or caller names a preset.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PresetRef {
    Index(usize),
    Name(String),
}

impl std::fmt::Display for PresetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(n) => write!(f, "'{n}'"),
        }
    }
}

/// The list of predefined templates, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetCatalog {
    pub presets: Vec<PresetEntry>,
}

impl PresetCatalog {
    pub fn from_json_str(s: &str) -> PhotoGridResult<Self> {
        let catalog: Self = serde_json::from_str(s)
            .map_err(|e| PhotoGridError::serde(format!("parse preset catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> PhotoGridResult<Self> {
        let catalog: Self = serde_json::from_reader(r)
            .map_err(|e| PhotoGridError::serde(format!("parse preset catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PhotoGridResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PhotoGridError::validation(format!("open preset catalog '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Names must be unique and non-empty; URLs, when present, non-empty.
    pub fn validate(&self) -> PhotoGridResult<()> {
        for (i, p) in self.presets.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(PhotoGridError::validation(format!(
                    "preset #{i} has an empty name"
                )));
            }
            if self.presets[..i].iter().any(|q| q.name == p.name) {
                return Err(PhotoGridError::validation(format!(
                    "duplicate preset name '{}'",
                    p.name
                )));
            }
            let bg_url = match &p.background {
                Some(BackgroundSource::Image { url }) => Some(url.as_str()),
                _ => None,
            };
            if p.url.as_deref().into_iter().chain(bg_url).any(|u| u.trim().is_empty()) {
                return Err(PhotoGridError::validation(format!(
                    "preset '{}' has an empty url",
                    p.name
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PresetEntry> {
        self.presets.get(index)
    }

    /// Index of the preset called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.presets.iter().position(|p| p.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&PresetEntry> {
        self.position(name).and_then(|i| self.get(i))
    }

    /// Resolve a reference to `(index, entry)`.
    pub fn lookup(&self, r: &PresetRef) -> PhotoGridResult<(usize, &PresetEntry)> {
        let idx = match r {
            PresetRef::Index(i) => Some(*i).filter(|i| *i < self.len()),
            PresetRef::Name(n) => self.position(n),
        };
        idx.and_then(|i| self.get(i).map(|p| (i, p)))
            .ok_or_else(|| PhotoGridError::template(format!("no preset {r} in catalog")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/catalog.rs"]
mod tests;
