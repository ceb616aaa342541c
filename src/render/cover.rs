//! Cover-fit placement: scale a photo so it fills a rectangle with no gaps, then pan inside the
//! overflow.

use crate::foundation::{
    core::{Affine, PhotoTransform, Point, Rect, Size, Vec2},
    error::{PhotoGridError, PhotoGridResult},
};

/// Exact source-to-destination mapping for one cover-fitted draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverPlacement {
    /// Destination rectangle; painting never leaves it.
    pub dest: Rect,
    /// Smallest uniform scale that covers `dest`.
    pub cover_scale: f64,
    /// `cover_scale` times the user zoom.
    pub scale: f64,
    /// Where the scaled source's top-left corner lands.
    pub origin: Point,
    /// Source size after scaling.
    pub scaled_size: Size,
}

impl CoverPlacement {
    /// How far the scaled source extends past the destination on each axis.
    ///
    /// Pan has no visible effect on an axis whose overflow is zero.
    pub fn overflow(&self) -> Vec2 {
        Vec2::new(
            self.scaled_size.width - self.dest.width(),
            self.scaled_size.height - self.dest.height(),
        )
    }

    /// Maps source pixel space into canvas space.
    pub fn image_affine(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::scale(self.scale)
    }

    /// Bounds of the whole scaled source in canvas space.
    pub fn scaled_bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.scaled_size)
    }

    /// The part of the source that ends up inside `dest`, in source pixel space.
    pub fn source_clip(&self) -> Rect {
        Rect::new(
            (self.dest.x0 - self.origin.x) / self.scale,
            (self.dest.y0 - self.origin.y) / self.scale,
            (self.dest.x1 - self.origin.x) / self.scale,
            (self.dest.y1 - self.origin.y) / self.scale,
        )
    }
}

/// Compute the cover-fit placement of a `src`-sized image inside `dest`.
///
/// Pan percentages are clamped to `[0, 100]` and zoom never drops below the cover baseline, so
/// the result always fills `dest` completely. Non-positive or non-finite inputs, or a placement
/// that overflows to non-finite values, are rejected so the caller can skip the draw.
pub fn plan_cover(src: Size, dest: Rect, transform: PhotoTransform) -> PhotoGridResult<CoverPlacement> {
    let (src_w, src_h) = (src.width, src.height);
    let (dest_w, dest_h) = (dest.width(), dest.height());
    for (name, v) in [("source width", src_w), ("source height", src_h)] {
        if !v.is_finite() || v <= 0.0 {
            return Err(PhotoGridError::render(format!(
                "cover fit needs a positive finite {name}, got {v}"
            )));
        }
    }
    if !(dest_w.is_finite() && dest_h.is_finite() && dest_w > 0.0 && dest_h > 0.0) {
        return Err(PhotoGridError::layout(format!(
            "destination {dest_w}x{dest_h} cannot hold a photo"
        )));
    }

    let cover_scale = (dest_w / src_w).max(dest_h / src_h);
    let scale = cover_scale * transform.scale.max(1.0);
    let scaled_size = Size::new(src_w * scale, src_h * scale);

    let pan_x = transform.pan_x.clamp(PhotoTransform::PAN_MIN, PhotoTransform::PAN_MAX) / 100.0;
    let pan_y = transform.pan_y.clamp(PhotoTransform::PAN_MIN, PhotoTransform::PAN_MAX) / 100.0;
    let origin = Point::new(
        dest.x0 + (dest_w - scaled_size.width) * pan_x,
        dest.y0 + (dest_h - scaled_size.height) * pan_y,
    );

    if ![scale, scaled_size.width, scaled_size.height, origin.x, origin.y]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(PhotoGridError::render(format!(
            "cover fit produced non-finite draw parameters (scale {scale}, origin {origin:?})"
        )));
    }

    Ok(CoverPlacement {
        dest,
        cover_scale,
        scale,
        origin,
        scaled_size,
    })
}

/// Paint `image` with `placement`, touching only pixels inside `placement.dest`.
///
/// The geometry filled is the destination rectangle mapped back into source space, so the clip
/// is the fill itself rather than a separate clip layer.
pub(crate) fn paint_cover(
    ctx: &mut vello_cpu::RenderContext,
    image: &vello_cpu::Image,
    placement: &CoverPlacement,
) {
    let clip = placement.source_clip();
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(placement.image_affine()));
    ctx.set_paint(image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(clip.x0, clip.y0, clip.x1, clip.y1));
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cover.rs"]
mod tests;
