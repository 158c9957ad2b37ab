//! photostrip drives a photo booth: a session state machine walks the user through layout,
//! frame, capture and review, and a composite engine renders the selected photos into one
//! styled strip or grid image.
//!
//! - Pick a [`Layout`] and optional [`Frame`] from the [`catalog`]
//! - Drive a [`PhotoSession`] with captured stills
//! - Read the [`CompositeOutput`] or hand it to an [`OutputSink`]
//!
//! The [`CompositeEngine`] and [`apply_filter`] are usable on their own.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod delivery;
mod effects;
mod foundation;
mod render;
mod session;

pub mod catalog;

pub use crate::assets::encode::OutputFormat;
pub use crate::assets::source::{
    AssetSource, BundledAssets, DirAssetSource, MemoryAssetSource, normalize_rel_path,
};
pub use crate::catalog::frames::{Frame, FrameCategory, FrameId};
pub use crate::catalog::layouts::{Layout, LayoutKind, LayoutType};
pub use crate::config::{EngineConfig, HexColor, SessionConfig};
pub use crate::delivery::sink::{DeliveryMeta, DirectorySink, InMemorySink, OutputSink};
pub use crate::effects::filter::{FilterKind, apply_filter, apply_filter_seeded, luma};
pub use crate::foundation::core::{Canvas, Orientation, Rect, Rgba8Premul};
pub use crate::foundation::error::{PhotoStripError, PhotoStripResult};
pub use crate::render::engine::{CompositeEngine, CompositeOutput};
pub use crate::render::geometry::{SlotRect, slot_rects};
pub use crate::session::photo_session::{CompositeJob, PhotoSession};
pub use crate::session::state::{
    CapturedPhoto, CompositeKey, FacingMode, PhotoId, SessionState, Step,
};
