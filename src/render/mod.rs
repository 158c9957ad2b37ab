//! Composite rendering: slot geometry, the canvas raster and the engine entry points.

pub(crate) mod canvas;
pub(crate) mod engine;
pub(crate) mod geometry;
