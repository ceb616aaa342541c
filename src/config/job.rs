use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    assets::{
        color::Color,
        decode::{RasterImage, load_raster},
    },
    foundation::{
        core::{Edges, PhotoTransform},
        error::{PhotoGridError, PhotoGridResult},
    },
    layout::grid::SlotPosition,
    session::state::{BackgroundType, SessionState},
    template::{
        catalog::{PresetCatalog, PresetRef},
        resolve::{FsFetcher, TemplateBundle, resolve_custom, resolve_preset},
    },
};

/// Template selection in a job file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSpec {
    /// No template; export stays gated.
    #[default]
    None,
    /// A catalog entry by index or name.
    Preset(PresetRef),
    /// A user-supplied overlay (or none) with editable margins.
    Custom(CustomTemplateSpec),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomTemplateSpec {
    #[serde(default)]
    pub overlay: Option<PathBuf>,
    #[serde(default)]
    pub margins: Edges,
}

/// Manual background in a job file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSpec {
    Color(Color),
    Image(PathBuf),
}

/// One photo slot in a job file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoSpec {
    pub path: PathBuf,
    #[serde(flatten)]
    pub transform: PhotoTransform,
}

/// A complete, declarative composition request. Paths are relative to the job file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Preset catalog, required when `template` names a preset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub template: TemplateSpec,
    #[serde(default)]
    pub background: Option<BackgroundSpec>,
    /// Margin override; only valid with a custom template.
    #[serde(default)]
    pub margins: Option<Edges>,
    /// Up to four photos in slot order; `null` leaves a slot empty.
    #[serde(default)]
    pub photos: Vec<Option<PhotoSpec>>,
}

impl Job {
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotoGridResult<Self> {
        let job: Self = serde_json::from_reader(r)
            .map_err(|e| PhotoGridError::serde(format!("parse job JSON: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PhotoGridResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PhotoGridError::validation(format!("open job JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> PhotoGridResult<()> {
        if self.photos.len() > SlotPosition::ALL.len() {
            return Err(PhotoGridError::validation(format!(
                "a job holds at most 4 photos, got {}",
                self.photos.len()
            )));
        }
        if matches!(self.template, TemplateSpec::Preset(_)) && self.catalog.is_none() {
            return Err(PhotoGridError::validation(
                "a preset template needs a 'catalog'",
            ));
        }
        Ok(())
    }

    /// Load every input and build the resulting session.
    ///
    /// Photos decode in parallel with template resolution. A photo or background image that
    /// fails to load is logged and left out; template and catalog failures fail the job.
    #[tracing::instrument(level = "info", skip(self), fields(base = %base_dir.display()))]
    pub fn build_session(&self, base_dir: &Path) -> PhotoGridResult<SessionState> {
        self.validate()?;
        let mut state = SessionState::new();

        let mut tickets = Vec::new();
        for (i, spec) in self.photos.iter().enumerate() {
            let (Some(spec), Some(slot)) = (spec, SlotPosition::from_index(i)) else {
                continue;
            };
            let (next, ticket) = state.begin_photo_load(slot);
            state = next;
            tickets.push((slot, ticket, base_dir.join(&spec.path), spec.transform));
        }
        let template_load = match self.template {
            TemplateSpec::None => None,
            _ => {
                let (next, ticket) = state.begin_template_load();
                state = next;
                Some(ticket)
            }
        };

        let (decoded, bundle) = rayon::join(
            || {
                tickets
                    .par_iter()
                    .map(|(_, _, path, _)| load_raster(path))
                    .collect::<Vec<PhotoGridResult<RasterImage>>>()
            },
            || template_load.map(|_| self.resolve_template(base_dir)),
        );

        for ((slot, ticket, path, transform), image) in tickets.into_iter().zip(decoded) {
            match image {
                Ok(image) => {
                    tracing::debug!(?slot, w = image.width, h = image.height, "photo decoded");
                    state = state.complete_photo_load(ticket, image)?.0;
                    state = state.set_transform(slot, transform);
                }
                Err(error) => {
                    tracing::warn!(?slot, path = %path.display(), %error, "photo skipped");
                    state = state.fail_load(ticket).0;
                }
            }
        }

        if let (Some(ticket), Some(bundle)) = (template_load, bundle) {
            state = state.complete_template_load(ticket, bundle?)?.0;
        }

        match &self.background {
            None => {}
            Some(BackgroundSpec::Color(c)) => {
                state = state
                    .set_background_type(BackgroundType::Color)
                    .set_background_color(*c);
            }
            Some(BackgroundSpec::Image(p)) => {
                let (next, ticket) = state
                    .set_background_type(BackgroundType::Image)
                    .begin_background_load();
                let path = base_dir.join(p);
                state = match load_raster(&path) {
                    Ok(image) => next.complete_background_load(ticket, image)?.0,
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "background image skipped");
                        next.fail_load(ticket)
                            .0
                            .set_background_type(BackgroundType::Color)
                    }
                };
            }
        }

        if let Some(m) = self.margins {
            state = state.set_margins(m)?;
        }
        Ok(state)
    }

    fn resolve_template(&self, base_dir: &Path) -> PhotoGridResult<TemplateBundle> {
        match &self.template {
            TemplateSpec::None => Err(PhotoGridError::template("no template requested")),
            TemplateSpec::Preset(r) => {
                let catalog_path = self
                    .catalog
                    .as_ref()
                    .map(|c| base_dir.join(c))
                    .ok_or_else(|| PhotoGridError::validation("a preset template needs a 'catalog'"))?;
                let catalog = PresetCatalog::from_path(&catalog_path)?;
                let (index, entry) = catalog.lookup(r)?;
                resolve_preset(index, entry, &FsFetcher::for_catalog(&catalog_path))
            }
            TemplateSpec::Custom(spec) => {
                let overlay = spec
                    .overlay
                    .as_ref()
                    .map(|p| {
                        let p = base_dir.join(p);
                        std::fs::read(&p).map_err(|e| {
                            PhotoGridError::template(format!(
                                "read custom overlay '{}': {e}",
                                p.display()
                            ))
                        })
                    })
                    .transpose()?;
                let hint = spec.overlay.as_deref().and_then(Path::to_str);
                resolve_custom(overlay.as_deref(), hint, spec.margins)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/job.rs"]
mod tests;
