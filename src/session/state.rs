//! Editing session as an immutable value.
//!
//! Every mutation returns a new [`SessionState`]; the old one stays valid, so a renderer can keep
//! painting a snapshot while the next revision is being built. Asynchronous inputs (photo decodes,
//! template and background fetches) are modeled as [`LoadTicket`]s: a load is started against one
//! revision and its result is applied to whatever revision is current when it finishes, but only
//! if the ticket's generation still matches. Anything else is stale and dropped.

use crate::{
    assets::{color::Color, decode::RasterImage},
    foundation::{
        core::{Canvas, Edges, PhotoTransform},
        error::{PhotoGridError, PhotoGridResult},
        math::Fnv1a64,
    },
    layout::grid::SlotPosition,
    render::compositor::{BackgroundPaint, Scene, SlotPhoto},
    template::resolve::{TemplateBundle, TemplateChoice},
};

/// What an asynchronous load is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "kind", content = "slot", rename_all = "snake_case")]
pub enum LoadKind {
    Photo(SlotPosition),
    Template,
    Background,
}

/// Handle for one in-flight load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct LoadTicket {
    pub kind: LoadKind,
    pub generation: u64,
}

/// Whether a finished load changed the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// Superseded by a newer load or a clear; the result was discarded.
    Stale,
}

/// Which manual background the user chose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
}

#[derive(Clone, Debug, Default)]
struct PhotoSlot {
    image: Option<RasterImage>,
    transform: PhotoTransform,
    generation: u64,
}

/// Why export is currently allowed or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportGate {
    pub photos_loaded: usize,
    pub template_present: bool,
    pub template_pending: bool,
}

impl ExportGate {
    pub fn is_open(&self) -> bool {
        self.photos_loaded > 0 && self.template_present && !self.template_pending
    }

    /// `Ok` when open, otherwise a validation error naming the first blocker.
    pub fn check(&self) -> PhotoGridResult<()> {
        if self.template_pending {
            return Err(PhotoGridError::validation(
                "export blocked: a template is still loading",
            ));
        }
        if !self.template_present {
            return Err(PhotoGridError::validation(
                "export blocked: no template selected",
            ));
        }
        if self.photos_loaded == 0 {
            return Err(PhotoGridError::validation(
                "export blocked: no photos loaded",
            ));
        }
        Ok(())
    }
}

/// Stable hash of everything that influences the rendered pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneFingerprint(pub u64);

/// One revision of the editing session.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    revision: u64,
    slots: [PhotoSlot; 4],
    template: Option<TemplateBundle>,
    template_generation: u64,
    template_pending: bool,
    custom_margins: Edges,
    background_type: BackgroundType,
    background_color: Color,
    background_image: Option<RasterImage>,
    background_generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> Self {
        let mut s = self.clone();
        s.revision += 1;
        s
    }

    /// Incremented by every mutation, including ones that end up stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn photo(&self, slot: SlotPosition) -> Option<&RasterImage> {
        self.slots[slot.index()].image.as_ref()
    }

    pub fn transform(&self, slot: SlotPosition) -> PhotoTransform {
        self.slots[slot.index()].transform
    }

    pub fn photo_count(&self) -> usize {
        self.slots.iter().filter(|s| s.image.is_some()).count()
    }

    /// Start loading a photo into `slot`. Any earlier load for the slot becomes stale.
    pub fn begin_photo_load(&self, slot: SlotPosition) -> (Self, LoadTicket) {
        let mut s = self.next();
        let entry = &mut s.slots[slot.index()];
        entry.generation += 1;
        let ticket = LoadTicket {
            kind: LoadKind::Photo(slot),
            generation: entry.generation,
        };
        (s, ticket)
    }

    /// Assign a decoded photo if `ticket` is still current. The slot's transform resets.
    pub fn complete_photo_load(
        &self,
        ticket: LoadTicket,
        image: RasterImage,
    ) -> PhotoGridResult<(Self, LoadOutcome)> {
        let LoadKind::Photo(slot) = ticket.kind else {
            return Err(wrong_ticket("photo", ticket));
        };
        if self.slots[slot.index()].generation != ticket.generation {
            tracing::debug!(?slot, generation = ticket.generation, "stale photo load dropped");
            return Ok((self.clone(), LoadOutcome::Stale));
        }
        let mut s = self.next();
        let entry = &mut s.slots[slot.index()];
        entry.image = Some(image);
        entry.transform = PhotoTransform::CENTERED;
        Ok((s, LoadOutcome::Applied))
    }

    /// Empty `slot` and invalidate any load still in flight for it.
    pub fn clear_photo(&self, slot: SlotPosition) -> Self {
        let mut s = self.next();
        let entry = &mut s.slots[slot.index()];
        entry.generation += 1;
        entry.image = None;
        entry.transform = PhotoTransform::CENTERED;
        s
    }

    pub fn clear_all_photos(&self) -> Self {
        let mut s = self.next();
        for entry in &mut s.slots {
            entry.generation += 1;
            entry.image = None;
            entry.transform = PhotoTransform::CENTERED;
        }
        s
    }

    /// Set pan/zoom for `slot`; values are clamped into range.
    pub fn set_transform(&self, slot: SlotPosition, transform: PhotoTransform) -> Self {
        let mut s = self.next();
        s.slots[slot.index()].transform = transform.clamped();
        s
    }

    pub fn template(&self) -> Option<&TemplateBundle> {
        self.template.as_ref()
    }

    pub fn template_choice(&self) -> Option<&TemplateChoice> {
        self.template.as_ref().map(|t| &t.choice)
    }

    pub fn template_pending(&self) -> bool {
        self.template_pending
    }

    /// Start resolving a template. The current bundle stays active until the new one lands.
    pub fn begin_template_load(&self) -> (Self, LoadTicket) {
        let mut s = self.next();
        s.template_generation += 1;
        s.template_pending = true;
        let ticket = LoadTicket {
            kind: LoadKind::Template,
            generation: s.template_generation,
        };
        (s, ticket)
    }

    /// Swap in a resolved bundle as one unit if `ticket` is still current.
    pub fn complete_template_load(
        &self,
        ticket: LoadTicket,
        bundle: TemplateBundle,
    ) -> PhotoGridResult<(Self, LoadOutcome)> {
        if ticket.kind != LoadKind::Template {
            return Err(wrong_ticket("template", ticket));
        }
        if ticket.generation != self.template_generation {
            tracing::debug!(generation = ticket.generation, "stale template load dropped");
            return Ok((self.clone(), LoadOutcome::Stale));
        }
        let mut s = self.next();
        if bundle.margins_editable {
            s.custom_margins = bundle.margins;
        }
        s.template = Some(bundle);
        s.template_pending = false;
        Ok((s, LoadOutcome::Applied))
    }

    /// Record that a load failed.
    ///
    /// A failed photo empties its slot and a failed background image drops the manual image.
    /// A failed template only clears the pending flag, so the previous bundle stays active.
    pub fn fail_load(&self, ticket: LoadTicket) -> (Self, LoadOutcome) {
        let current = match ticket.kind {
            LoadKind::Photo(slot) => self.slots[slot.index()].generation,
            LoadKind::Template => self.template_generation,
            LoadKind::Background => self.background_generation,
        };
        if current != ticket.generation {
            return (self.clone(), LoadOutcome::Stale);
        }
        let mut s = self.next();
        match ticket.kind {
            LoadKind::Photo(slot) => {
                let entry = &mut s.slots[slot.index()];
                entry.image = None;
                entry.transform = PhotoTransform::CENTERED;
            }
            LoadKind::Template => s.template_pending = false,
            LoadKind::Background => s.background_image = None,
        }
        (s, LoadOutcome::Applied)
    }

    /// Drop the active template and cancel any pending one.
    pub fn clear_template(&self) -> Self {
        let mut s = self.next();
        s.template_generation += 1;
        s.template_pending = false;
        s.template = None;
        s
    }

    /// Margins in effect for the grid.
    pub fn margins(&self) -> Edges {
        self.template.as_ref().map_or(Edges::ZERO, |t| t.margins)
    }

    pub fn padding(&self) -> Edges {
        self.template.as_ref().map_or(Edges::ZERO, |t| t.padding)
    }

    /// Margins last entered for a custom template; reused when building the next one.
    pub fn custom_margins(&self) -> Edges {
        self.custom_margins
    }

    /// Edit margins. Only templates that allow it accept edits.
    pub fn set_margins(&self, margins: Edges) -> PhotoGridResult<Self> {
        match &self.template {
            Some(t) if t.margins_editable => {
                let mut s = self.next();
                s.custom_margins = margins;
                if let Some(t) = s.template.as_mut() {
                    t.margins = margins;
                }
                Ok(s)
            }
            Some(_) => Err(PhotoGridError::validation(
                "margins are fixed by the active preset",
            )),
            None => Err(PhotoGridError::validation("no template selected")),
        }
    }

    /// Whether the active template overrides the manual background.
    pub fn background_locked(&self) -> bool {
        self.template
            .as_ref()
            .is_some_and(|t| t.background.is_some())
    }

    pub fn background_type(&self) -> BackgroundType {
        self.background_type
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn background_image(&self) -> Option<&RasterImage> {
        self.background_image.as_ref()
    }

    /// Switch the manual background kind. Changing it drops the loaded manual image.
    pub fn set_background_type(&self, ty: BackgroundType) -> Self {
        let mut s = self.next();
        if s.background_type != ty {
            s.background_type = ty;
            s.background_image = None;
            s.background_generation += 1;
        }
        s
    }

    pub fn set_background_color(&self, color: Color) -> Self {
        let mut s = self.next();
        s.background_color = color;
        s
    }

    pub fn begin_background_load(&self) -> (Self, LoadTicket) {
        let mut s = self.next();
        s.background_generation += 1;
        let ticket = LoadTicket {
            kind: LoadKind::Background,
            generation: s.background_generation,
        };
        (s, ticket)
    }

    /// Store a manual background image if `ticket` is still current.
    pub fn complete_background_load(
        &self,
        ticket: LoadTicket,
        image: RasterImage,
    ) -> PhotoGridResult<(Self, LoadOutcome)> {
        if ticket.kind != LoadKind::Background {
            return Err(wrong_ticket("background", ticket));
        }
        if ticket.generation != self.background_generation {
            return Ok((self.clone(), LoadOutcome::Stale));
        }
        let mut s = self.next();
        s.background_type = BackgroundType::Image;
        s.background_image = Some(image);
        Ok((s, LoadOutcome::Applied))
    }

    pub fn clear_background_image(&self) -> Self {
        let mut s = self.next();
        s.background_generation += 1;
        s.background_image = None;
        s
    }

    /// The background that will actually be painted: the template's if it has one, otherwise the
    /// manual choice. A manual image type with no image loaded paints the manual color.
    pub fn effective_background(&self) -> BackgroundPaint {
        if let Some(bg) = self.template.as_ref().and_then(|t| t.background.clone()) {
            return bg;
        }
        match (&self.background_type, &self.background_image) {
            (BackgroundType::Image, Some(img)) => BackgroundPaint::Image(img.clone()),
            _ => BackgroundPaint::Color(self.background_color),
        }
    }

    /// Canvas size: the overlay's natural size, else the background image's, else the fallback.
    pub fn canvas(&self) -> PhotoGridResult<Canvas> {
        if let Some(overlay) = self.template.as_ref().and_then(|t| t.overlay.as_ref()) {
            return Canvas::new(overlay.width, overlay.height);
        }
        if let BackgroundPaint::Image(img) = self.effective_background() {
            return Canvas::new(img.width, img.height);
        }
        Ok(Canvas::FALLBACK)
    }

    /// Snapshot of everything needed to paint this revision.
    pub fn scene(&self) -> PhotoGridResult<Scene> {
        let slots = std::array::from_fn(|i| {
            let entry = &self.slots[i];
            entry.image.as_ref().map(|image| SlotPhoto {
                image: image.clone(),
                transform: entry.transform,
            })
        });
        Ok(Scene {
            canvas: self.canvas()?,
            margins: self.margins(),
            padding: self.padding(),
            background: self.effective_background(),
            overlay: self.template.as_ref().and_then(|t| t.overlay.clone()),
            slots,
        })
    }

    pub fn export_gate(&self) -> ExportGate {
        ExportGate {
            photos_loaded: self.photo_count(),
            template_present: self.template.is_some(),
            template_pending: self.template_pending,
        }
    }

    /// Fingerprint of the rendered output. Two states with equal fingerprints draw the same pixels.
    pub fn fingerprint(&self) -> PhotoGridResult<SceneFingerprint> {
        Ok(fingerprint_scene(&self.scene()?))
    }
}

fn wrong_ticket(expected: &str, ticket: LoadTicket) -> PhotoGridError {
    PhotoGridError::validation(format!(
        "expected a {expected} load ticket, got {:?}",
        ticket.kind
    ))
}

pub(crate) fn fingerprint_scene(scene: &Scene) -> SceneFingerprint {
    fn edges(h: &mut Fnv1a64, e: Edges) {
        for v in [e.top, e.bottom, e.left, e.right] {
            h.write_u32(v);
        }
    }

    let mut h = Fnv1a64::new_default();
    h.write_u32(scene.canvas.width);
    h.write_u32(scene.canvas.height);
    edges(&mut h, scene.margins);
    edges(&mut h, scene.padding);
    match &scene.background {
        BackgroundPaint::Color(c) => {
            h.write_u8(0);
            h.write_bytes(&[c.r, c.g, c.b, c.a]);
        }
        BackgroundPaint::Image(img) => {
            h.write_u8(1);
            h.write_u64(img.id().as_u64());
        }
    }
    h.write_u64(scene.overlay.as_ref().map_or(0, |o| o.id().as_u64()));
    for slot in &scene.slots {
        match slot {
            None => h.write_u8(0),
            Some(p) => {
                h.write_u8(1);
                h.write_u64(p.image.id().as_u64());
                h.write_f64(p.transform.scale);
                h.write_f64(p.transform.pan_x);
                h.write_f64(p.transform.pan_y);
            }
        }
    }
    SceneFingerprint(h.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
