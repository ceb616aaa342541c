//! photogrid composites up to four photos into a 2×2 grid, layered between a background and a
//! decorative template overlay, and exports the result as one flattened raster.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: a preset or custom upload becomes a [`TemplateBundle`] (overlay, margins,
//!    padding, optional background).
//! 2. **Snapshot**: a [`SessionState`] revision turns into a [`Scene`].
//! 3. **Layout**: [`compute_grid`] splits the canvas interior into four padded cells.
//! 4. **Composite**: [`Compositor`] paints background, cover-fitted photos ([`plan_cover`]) and
//!    the overlay, in that order, onto a [`RasterSurface`].
//! 5. **Export**: [`encode_frame`] turns the frame into JPEG or PNG bytes.
//!
//! Preview and export go through the same compositor call, so they differ only in the surface
//! they land on.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Premultiplied RGBA8** end-to-end; PNG export converts back to straight alpha.
//! - **No IO while compositing**: every raster is decoded before it reaches a [`Scene`].
#![forbid(unsafe_code)]

mod assets;
mod config;
mod encode;
mod foundation;
mod layout;
mod render;
mod session;
mod template;

pub use assets::color::Color;
pub use assets::decode::{
    RasterId, RasterImage, decode_any, decode_image, decode_svg, load_raster,
};
pub use config::job::{BackgroundSpec, CustomTemplateSpec, Job, PhotoSpec, TemplateSpec};
pub use encode::export::{DEFAULT_JPEG_QUALITY, ExportFormat, encode_frame, write_export};
pub use foundation::core::{
    Affine, Canvas, Edges, Margins, Padding, PhotoTransform, Point, Rect, Size, Vec2,
};
pub use foundation::error::{PhotoGridError, PhotoGridResult};
pub use layout::grid::{CellPlacement, GridLayout, GridOutcome, SlotPosition, compute_grid};
pub use render::compositor::{
    BackgroundPaint, CompositeReport, CompositeWarning, Compositor, Scene, SlotPhoto,
};
pub use render::cover::{CoverPlacement, plan_cover};
pub use render::surface::{FrameRGBA, RasterSurface, SurfaceRole};
pub use session::redraw::{RedrawReason, RedrawScheduler};
pub use session::state::{
    BackgroundType, ExportGate, LoadKind, LoadOutcome, LoadTicket, SceneFingerprint,
    SessionState,
};
pub use session::studio::{ExportOutput, Studio};
pub use template::catalog::{BackgroundSource, PresetCatalog, PresetEntry, PresetRef};
pub use template::resolve::{
    FsFetcher, ResourceFetcher, TemplateBundle, TemplateChoice, resolve_custom, resolve_preset,
};
