//! Export adapter: JPEG rasterization of the rendered surface and the share flow.

pub(crate) mod raster;
pub(crate) mod share;
