use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::frames::FrameId;
use crate::catalog::layouts::LayoutType;
use crate::effects::filter::FilterKind;
use crate::foundation::core::Orientation;
use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::foundation::math::Fnv1a64;

/// Where the user is in the booth flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Picking a layout.
    #[default]
    Layout,
    /// Picking (or skipping) a frame.
    Frame,
    /// Taking photos.
    Capture,
    /// Choosing photos and looking at the composite.
    Review,
}

impl Step {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Frame => "frame",
            Self::Capture => "capture",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which camera the capture collaborator should open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

impl FacingMode {
    /// The other camera.
    pub fn flipped(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl FromStr for FacingMode {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        match s {
            "user" => Ok(Self::User),
            "environment" => Ok(Self::Environment),
            other => Err(PhotoStripError::validation(format!(
                "facing mode must be 'user' or 'environment', got '{other}'"
            ))),
        }
    }
}

/// Session-unique photo id. Ids grow with capture order and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct PhotoId(pub u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo-{}", self.0)
    }
}

/// One photo owned by a session.
#[derive(Clone, Debug)]
pub struct CapturedPhoto {
    /// Session-unique id.
    pub id: PhotoId,
    /// Encoded image bytes, already filtered.
    pub image: Arc<Vec<u8>>,
    /// When the current revision was taken.
    pub captured_at: Instant,
    /// Bumped each time the photo is replaced by a retake.
    pub revision: u32,
}

/// Snapshot of everything a composite depends on.
///
/// Two equal keys always describe the same rendered output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// Layout rendered.
    pub layout: LayoutType,
    /// Canvas orientation.
    pub orientation: Orientation,
    /// Frame overlay, if any.
    pub frame: Option<FrameId>,
    /// Selected photos in slot order, with their revision.
    pub photos: Vec<(PhotoId, u32)>,
}

impl CompositeKey {
    /// Stable 64-bit digest, handy for logs.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(self.layout.as_str().as_bytes());
        h.write_bytes(self.orientation.as_str().as_bytes());
        match self.frame {
            Some(f) => {
                h.write_u8(1);
                h.write_bytes(f.as_str().as_bytes());
            }
            None => h.write_u8(0),
        }
        for (id, rev) in &self.photos {
            h.write_u64(id.0);
            h.write_u64(u64::from(*rev));
        }
        h.finish()
    }
}

/// Observable state of a [`crate::PhotoSession`].
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Current step.
    pub step: Step,
    /// Chosen layout.
    pub layout: Option<LayoutType>,
    /// Canvas orientation, defaulting to the layout's own.
    pub orientation: Orientation,
    /// Chosen frame overlay.
    pub frame: Option<FrameId>,
    /// Captures in capture order.
    pub captured: Vec<CapturedPhoto>,
    /// Selected photo ids in slot order.
    pub selection: Vec<PhotoId>,
    /// Camera the capture surface should use.
    pub facing_mode: FacingMode,
    /// Filter applied to new captures.
    pub filter: FilterKind,
    /// Index into `captured` that the next capture replaces.
    pub retake_index: Option<usize>,
}

impl SessionState {
    /// Captured photo with `id`.
    pub fn photo(&self, id: PhotoId) -> Option<&CapturedPhoto> {
        self.captured.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
