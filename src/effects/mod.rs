//! Pixel-level effects: per-photo filters and premultiplied blending.

pub(crate) mod composite;
pub(crate) mod filter;
