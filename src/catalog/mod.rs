//! Read-only layout and frame registries.

/// Decorative frame overlays grouped by category.
pub mod frames;
/// Layout geometries keyed by [`layouts::LayoutType`].
pub mod layouts;
