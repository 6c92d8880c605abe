//! Image sources, decoding and the asynchronous loader.

pub(crate) mod bitmap;
pub(crate) mod decode;
pub(crate) mod loader;
