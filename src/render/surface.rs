use crate::foundation::{
    core::Canvas,
    error::{PhotoGridError, PhotoGridResult},
    math::unpremultiply_rgba8_in_place,
};

/// A rendered raster read back from a surface.
///
/// Pixels are **premultiplied alpha**; the `premultiplied` flag makes that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Raw RGBA8 of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Which output a surface feeds. Both are painted by the same compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    Preview,
    Export,
}

/// CPU raster target backed by a `vello_cpu` pixmap.
pub struct RasterSurface {
    role: SurfaceRole,
    canvas: Option<Canvas>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("role", &self.role)
            .field("canvas", &self.canvas)
            .finish()
    }
}

impl RasterSurface {
    pub fn new(role: SurfaceRole) -> Self {
        Self {
            role,
            canvas: None,
            pixmap: None,
        }
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    /// Current size, or `None` before the first composite.
    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    /// Reallocate the pixmap when the canvas size changes. A fresh pixmap is transparent.
    ///
    /// Returns whether a reallocation happened.
    pub(crate) fn ensure_size(&mut self, canvas: Canvas) -> PhotoGridResult<bool> {
        if self.canvas == Some(canvas) && self.pixmap.is_some() {
            return Ok(false);
        }
        let (w, h) = surface_dims(canvas)?;
        self.pixmap = Some(vello_cpu::Pixmap::new(w, h));
        self.canvas = Some(canvas);
        Ok(true)
    }

    /// Rasterize everything recorded in `ctx` into this surface.
    pub(crate) fn present(&mut self, ctx: &vello_cpu::RenderContext) -> PhotoGridResult<()> {
        let pixmap = self
            .pixmap
            .as_mut()
            .ok_or_else(|| PhotoGridError::render("surface presented before it was sized"))?;
        ctx.render_to_pixmap(pixmap);
        Ok(())
    }

    /// Copy the current pixels out.
    pub fn readback(&self) -> PhotoGridResult<FrameRGBA> {
        let (Some(canvas), Some(pixmap)) = (self.canvas, self.pixmap.as_ref()) else {
            return Err(PhotoGridError::render(format!(
                "{:?} surface has not been rendered yet",
                self.role
            )));
        };
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

pub(crate) fn surface_dims(canvas: Canvas) -> PhotoGridResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| PhotoGridError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| PhotoGridError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
