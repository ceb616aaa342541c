use std::time::Instant;

use crate::{
    encode::export::{ExportFormat, encode_frame},
    foundation::error::PhotoGridResult,
    render::{
        compositor::{CompositeReport, Compositor},
        surface::{FrameRGBA, RasterSurface, SurfaceRole},
    },
    session::{
        redraw::{RedrawReason, RedrawScheduler},
        state::{SessionState, fingerprint_scene},
    },
};

/// An encoded export plus what went into it.
#[derive(Clone, Debug)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub report: CompositeReport,
}

/// Drives the preview and export surfaces from one compositor.
#[derive(Debug)]
pub struct Studio {
    compositor: Compositor,
    preview: RasterSurface,
    export: RasterSurface,
    scheduler: RedrawScheduler,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        Self {
            compositor: Compositor::new(),
            preview: RasterSurface::new(SurfaceRole::Preview),
            export: RasterSurface::new(SurfaceRole::Export),
            scheduler: RedrawScheduler::new(),
        }
    }

    pub fn request_redraw(&mut self, reason: RedrawReason, now: Instant) {
        self.scheduler.request(reason, now);
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    /// Redraw the preview if a request is due at `now`.
    pub fn tick(
        &mut self,
        state: &SessionState,
        now: Instant,
    ) -> PhotoGridResult<Option<CompositeReport>> {
        if !self.scheduler.poll(now) {
            return Ok(None);
        }
        self.refresh_preview(state)
    }

    /// Composite `state` onto the preview surface unless it is already showing it.
    pub fn refresh_preview(
        &mut self,
        state: &SessionState,
    ) -> PhotoGridResult<Option<CompositeReport>> {
        let scene = state.scene()?;
        if !self.scheduler.begin_draw(fingerprint_scene(&scene)) {
            tracing::trace!(revision = state.revision(), "preview unchanged");
            return Ok(None);
        }
        match self.compositor.composite(&scene, &mut self.preview) {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                self.scheduler.invalidate();
                Err(e)
            }
        }
    }

    pub fn preview_frame(&self) -> PhotoGridResult<FrameRGBA> {
        self.preview.readback()
    }

    /// Render `state` at full size and encode it. Refused while the export gate is closed.
    #[tracing::instrument(level = "info", skip(self, state), fields(revision = state.revision()))]
    pub fn export(
        &mut self,
        state: &SessionState,
        format: ExportFormat,
    ) -> PhotoGridResult<ExportOutput> {
        state.export_gate().check()?;
        let (report, frame) = self.render_export(state)?;
        let bytes = encode_frame(&frame, format)?;
        Ok(ExportOutput {
            bytes,
            format,
            report,
        })
    }

    /// Composite onto the export surface and read it back, without gating or encoding.
    pub fn render_export(
        &mut self,
        state: &SessionState,
    ) -> PhotoGridResult<(CompositeReport, FrameRGBA)> {
        let scene = state.scene()?;
        let report = self.compositor.composite(&scene, &mut self.export)?;
        let frame = self.export.readback()?;
        Ok((report, frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
