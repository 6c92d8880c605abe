//! Interactive editing state: the transform store, pointer mapping and the drag controller.

pub(crate) mod drag;
pub(crate) mod pointer;
pub(crate) mod transform_store;
