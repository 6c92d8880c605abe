//! CPU compositing: clip geometry, the scoped clip mask and the output surface.

pub(crate) mod clip;
pub(crate) mod cpu;
pub(crate) mod mask;
pub(crate) mod surface;
