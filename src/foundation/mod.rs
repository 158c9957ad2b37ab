//! Shared primitives: error taxonomy, canvas/color types and small integer math helpers.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
