//! Shared core types, pixel math and the crate error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
