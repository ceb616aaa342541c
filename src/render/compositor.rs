use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    assets::{
        color::Color,
        decode::{RasterId, RasterImage},
    },
    foundation::{
        core::{Affine, Canvas, Edges, PhotoTransform, Rect, Size},
        error::{PhotoGridError, PhotoGridResult},
    },
    layout::grid::{CellPlacement, GridOutcome, SlotPosition, compute_grid},
    render::{
        cover::{affine_to_cpu, paint_cover, plan_cover},
        surface::{RasterSurface, surface_dims},
    },
};

/// What fills the canvas before any photo is drawn.
#[derive(Clone, Debug)]
pub enum BackgroundPaint {
    /// Flood fill.
    Color(Color),
    /// Cover-fitted over the whole canvas, centered, no zoom.
    Image(RasterImage),
}

impl Default for BackgroundPaint {
    fn default() -> Self {
        Self::Color(Color::WHITE)
    }
}

/// A photo assigned to a slot, with its pan/zoom.
#[derive(Clone, Debug)]
pub struct SlotPhoto {
    pub image: RasterImage,
    pub transform: PhotoTransform,
}

/// Everything the compositor needs to produce one frame.
///
/// A scene is a plain snapshot: the preview and the export surface are painted from the same
/// value.
#[derive(Clone, Debug)]
pub struct Scene {
    pub canvas: Canvas,
    pub margins: Edges,
    pub padding: Edges,
    pub background: BackgroundPaint,
    /// Stretched over the whole canvas, drawn last.
    pub overlay: Option<RasterImage>,
    /// Indexed by [`SlotPosition::index`].
    pub slots: [Option<SlotPhoto>; 4],
}

impl Scene {
    /// An empty scene: white background, no photos, no overlay.
    pub fn blank(canvas: Canvas) -> Self {
        Self {
            canvas,
            margins: Edges::ZERO,
            padding: Edges::ZERO,
            background: BackgroundPaint::default(),
            overlay: None,
            slots: Default::default(),
        }
    }

    pub fn photo(&self, slot: SlotPosition) -> Option<&SlotPhoto> {
        self.slots[slot.index()].as_ref()
    }
}

/// A non-fatal problem found while compositing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositeWarning {
    /// Margins left no room for the grid; photos were not drawn.
    DegenerateGrid {
        interior_width: f64,
        interior_height: f64,
    },
    /// A loaded photo's cell was consumed by padding.
    CellSkipped { slot: SlotPosition },
    /// Drawing one photo failed; the rest of the frame is intact.
    PhotoFailed { slot: SlotPosition, message: String },
}

impl fmt::Display for CompositeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGrid {
                interior_width,
                interior_height,
            } => write!(
                f,
                "margins leave a {interior_width}x{interior_height} interior; photos skipped"
            ),
            Self::CellSkipped { slot } => {
                write!(f, "{slot:?} cell has no area after padding; photo skipped")
            }
            Self::PhotoFailed { slot, message } => write!(f, "{slot:?} photo not drawn: {message}"),
        }
    }
}

/// Outcome of one composite call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompositeReport {
    pub canvas: Canvas,
    pub grid: GridOutcome,
    /// Which slots received pixels, indexed by [`SlotPosition::index`].
    pub drawn: [bool; 4],
    pub warnings: Vec<CompositeWarning>,
}

impl CompositeReport {
    pub fn drawn_count(&self) -> usize {
        self.drawn.iter().filter(|d| **d).count()
    }
}

/// Paints scenes onto raster surfaces.
///
/// The only state kept between calls is a render context and a paint cache keyed by raster id;
/// neither influences the output, so identical scenes produce identical pixels.
#[derive(Default)]
pub struct Compositor {
    ctx: Option<vello_cpu::RenderContext>,
    paints: HashMap<RasterId, vello_cpu::Image>,
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("cached_paints", &self.paints.len())
            .finish_non_exhaustive()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint `scene` onto `surface`: background, then photos, then overlay.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(role = ?surface.role(), w = scene.canvas.width, h = scene.canvas.height)
    )]
    pub fn composite(
        &mut self,
        scene: &Scene,
        surface: &mut RasterSurface,
    ) -> PhotoGridResult<CompositeReport> {
        if surface.ensure_size(scene.canvas)? {
            tracing::debug!("surface reallocated");
        }
        let (w, h) = surface_dims(scene.canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let out = self.draw_layers(scene, &mut ctx);
        if out.is_ok() {
            ctx.flush();
            surface.present(&ctx)?;
        }
        self.ctx = Some(ctx);
        self.prune_paints(scene);

        let report = out?;
        for warning in &report.warnings {
            tracing::warn!(%warning, "composite warning");
        }
        Ok(report)
    }

    fn draw_layers(
        &mut self,
        scene: &Scene,
        ctx: &mut vello_cpu::RenderContext,
    ) -> PhotoGridResult<CompositeReport> {
        let full = scene.canvas.rect();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());

        match &scene.background {
            BackgroundPaint::Color(c) => {
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(c.to_paint());
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, full.x1, full.y1));
            }
            BackgroundPaint::Image(img) => {
                let placement = plan_cover(raster_size(img), full, PhotoTransform::CENTERED)?;
                let paint = self.paint_for(img)?;
                paint_cover(ctx, &paint, &placement);
            }
        }

        let grid = compute_grid(scene.canvas, scene.margins, scene.padding);
        let mut drawn = [false; 4];
        let mut warnings = Vec::new();

        if let GridOutcome::Degenerate {
            interior_width,
            interior_height,
        } = grid
            && scene.slots.iter().any(Option::is_some)
        {
            warnings.push(CompositeWarning::DegenerateGrid {
                interior_width,
                interior_height,
            });
        }

        if !grid.is_degenerate() {
            for slot in SlotPosition::ALL {
                let Some(photo) = scene.photo(slot) else {
                    continue;
                };
                let CellPlacement::Draw(cell) = grid.cell(slot) else {
                    warnings.push(CompositeWarning::CellSkipped { slot });
                    continue;
                };
                match self.draw_photo(ctx, photo, cell) {
                    Ok(()) => drawn[slot.index()] = true,
                    Err(e) => warnings.push(CompositeWarning::PhotoFailed {
                        slot,
                        message: e.to_string(),
                    }),
                }
            }
        }

        if let Some(overlay) = &scene.overlay {
            let paint = self.paint_for(overlay)?;
            let sx = full.width() / f64::from(overlay.width);
            let sy = full.height() / f64::from(overlay.height);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(sx, sy)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(overlay.width),
                f64::from(overlay.height),
            ));
        }

        Ok(CompositeReport {
            canvas: scene.canvas,
            grid,
            drawn,
            warnings,
        })
    }

    fn draw_photo(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        photo: &SlotPhoto,
        cell: Rect,
    ) -> PhotoGridResult<()> {
        let placement = plan_cover(raster_size(&photo.image), cell, photo.transform)?;
        let paint = self.paint_for(&photo.image)?;
        paint_cover(ctx, &paint, &placement);
        Ok(())
    }

    fn paint_for(&mut self, img: &RasterImage) -> PhotoGridResult<vello_cpu::Image> {
        if let Some(p) = self.paints.get(&img.id()) {
            return Ok(p.clone());
        }
        let pixmap = image_premul_bytes_to_pixmap(&img.rgba8_premul, img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.paints.insert(img.id(), paint.clone());
        Ok(paint)
    }

    /// Drop cached paints for rasters the scene no longer references.
    fn prune_paints(&mut self, scene: &Scene) {
        let mut live: Vec<RasterId> = scene
            .slots
            .iter()
            .flatten()
            .map(|p| p.image.id())
            .chain(scene.overlay.as_ref().map(RasterImage::id))
            .collect();
        if let BackgroundPaint::Image(img) = &scene.background {
            live.push(img.id());
        }
        self.paints.retain(|id, _| live.contains(id));
    }
}

fn raster_size(img: &RasterImage) -> Size {
    Size::new(f64::from(img.width), f64::from(img.height))
}

fn image_premul_bytes_to_pixmap(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PhotoGridResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PhotoGridError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PhotoGridError::render("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PhotoGridError::render("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
