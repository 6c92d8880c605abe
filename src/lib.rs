//! Posterkit is an interactive photo-on-template compositing engine.
//!
//! A user picks a photo; Posterkit decodes it off-thread, places it over a fixed background
//! template, clips it to a circle or rounded rectangle, lets pointer input drag it around and
//! finally exports the composite as a JPEG or shares a link to it.
//!
//! # Pipeline overview
//!
//! 1. **Load**: [`ImageLoader`] decodes the background (once) and overlay photos on a worker pool.
//!    Every request carries a [`RequestId`]; only the latest one per slot is committed.
//! 2. **Edit**: [`TransformStore`] holds the overlay placement. [`DragController`] turns
//!    [`PointerEvent`]s into transform writes after hit-testing the overlay bbox.
//! 3. **Render**: [`CpuCompositor`] clears to white, stretches the background over the
//!    [`Surface`], then draws the overlay through a scoped clip mask.
//! 4. **Export**: [`encode_jpeg`] rasterizes the surface; [`share()`] offers link metadata to the
//!    platform and falls back to the clipboard.
//!
//! [`Session`] ties these together for one editor instance.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No panics on input**: bad files, bad pointer coordinates and missing platform features are
//!   reported as values.
//! - **Premultiplied RGBA8** end-to-end until export.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod editor;
mod export;
mod foundation;
mod render;
mod session;

pub use assets::bitmap::Bitmap;
pub use assets::decode::{decode_background, decode_image, rasterize_svg};
pub use assets::loader::{
    ImageLoader, ImageSource, LoadCompletion, LoadResult, RequestId, Slot,
};
pub use config::{DragPolicy, EditorConfig};
pub use editor::drag::{
    ClampPolicy, DragController, DragExtent, DragSession, DragState, KeepOverlap,
    PointerResponse, Unclamped, hit_test,
};
pub use editor::pointer::{CanvasViewport, PointerEvent, PointerPhase};
pub use editor::transform_store::{ScaleBounds, TransformAccess, TransformStore};
pub use export::raster::{ExportSettings, ExportedImage, encode_jpeg};
pub use export::share::{
    Clipboard, CommandClipboard, FAILED_NOTICE, FALLBACK_NOTICE, MemoryClipboard, NO_LINK_NOTICE,
    ShareOutcome, SharePayload, ShareTarget, Unsupported, share,
};
pub use foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul, Size, Transform, Vec2};
pub use foundation::error::{PosterError, PosterResult};
pub use render::clip::{ClipGeometry, ClipShape};
pub use render::cpu::{CpuCompositor, OverlayDraw};
pub use render::surface::Surface;
pub use session::{LoadOutcome, Session};
