use std::sync::Arc;
use std::time::Instant;

use crate::catalog::frames::{self, FrameId};
use crate::catalog::layouts::{self, Layout, LayoutType};
use crate::config::SessionConfig;
use crate::delivery::sink::{DeliveryMeta, OutputSink};
use crate::effects::filter::{FilterKind, apply_filter};
use crate::foundation::core::Orientation;
use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::render::engine::{CompositeEngine, CompositeOutput};
use crate::session::state::{
    CapturedPhoto, CompositeKey, FacingMode, PhotoId, SessionState, Step,
};

/// A self-contained render request detached from the session.
///
/// Obtained from [`PhotoSession::composite_job`]; may be run on any thread. Install the result
/// with [`PhotoSession::accept_composite`], which discards it if the inputs changed meanwhile.
#[derive(Clone, Debug)]
pub struct CompositeJob {
    key: CompositeKey,
    photos: Vec<Arc<Vec<u8>>>,
    engine: Arc<CompositeEngine>,
}

impl CompositeJob {
    /// Inputs this job renders.
    pub fn key(&self) -> &CompositeKey {
        &self.key
    }

    /// Render the composite. Blocks the calling thread.
    pub fn run(&self) -> PhotoStripResult<CompositeOutput> {
        let photos: Vec<&[u8]> = self.photos.iter().map(|p| p.as_slice()).collect();
        self.engine
            .compose(self.key.layout, self.key.orientation, &photos, self.key.frame)
    }
}

/// One user's pass through the photo booth: layout, frame, capture, review.
///
/// Every operation is synchronous and leaves the session consistent. After each mutation the
/// composite is brought up to date with [`PhotoSession::recompute_composite_if_ready`].
#[derive(Debug)]
pub struct PhotoSession {
    config: SessionConfig,
    engine: Arc<CompositeEngine>,
    state: SessionState,
    next_id: u64,
    composite: Option<(CompositeKey, CompositeOutput)>,
}

impl PhotoSession {
    /// New session with a private engine built from `config.engine`.
    pub fn new(config: SessionConfig) -> PhotoStripResult<Self> {
        config.validate()?;
        let engine = Arc::new(CompositeEngine::new(config.engine.clone())?);
        Ok(Self::with_engine(config, engine))
    }

    /// New session sharing `engine`. The engine's own config governs rendering.
    pub fn with_engine(config: SessionConfig, engine: Arc<CompositeEngine>) -> Self {
        Self {
            config,
            engine,
            state: SessionState::default(),
            next_id: 0,
            composite: None,
        }
    }

    /// Settings the session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the whole session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current step.
    pub fn step(&self) -> Step {
        self.state.step
    }

    /// Chosen layout, if any.
    pub fn layout(&self) -> Option<&'static Layout> {
        self.state.layout.map(layouts::get)
    }

    /// Canvas orientation of the next composite.
    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    /// Chosen frame, `None` when skipped.
    pub fn frame(&self) -> Option<FrameId> {
        self.state.frame
    }

    /// Captures in capture order.
    pub fn captured_photos(&self) -> &[CapturedPhoto] {
        &self.state.captured
    }

    /// Selected photo ids in selection order.
    pub fn selection(&self) -> &[PhotoId] {
        &self.state.selection
    }

    /// Camera the capture surface should use.
    pub fn facing_mode(&self) -> FacingMode {
        self.state.facing_mode
    }

    /// Filter applied to new captures.
    pub fn filter(&self) -> FilterKind {
        self.state.filter
    }

    /// Capture slot the next capture will replace, if a retake is pending.
    pub fn retake_index(&self) -> Option<usize> {
        self.state.retake_index
    }

    /// The current composite, present only while the selection fills every slot.
    pub fn composite(&self) -> Option<&CompositeOutput> {
        self.composite.as_ref().map(|(_, out)| out)
    }

    /// Photos the chosen layout needs; zero before a layout is chosen.
    pub fn required_count(&self) -> usize {
        self.layout().map_or(0, |l| l.photo_count)
    }

    /// Captures still needed to fill the layout.
    pub fn remaining_captures(&self) -> usize {
        self.required_count()
            .saturating_sub(self.state.captured.len())
    }

    /// Whether every slot of the chosen layout has a capture.
    pub fn is_capture_complete(&self) -> bool {
        self.layout().is_some() && self.remaining_captures() == 0
    }

    /// Choose the layout and move on to frame selection.
    ///
    /// Captured photos and the selection are discarded, since their count may not fit the new
    /// layout.
    pub fn choose_layout(&mut self, id: LayoutType) {
        let layout = layouts::get(id);
        self.state.layout = Some(id);
        self.state.orientation = layout.orientation;
        self.state.captured.clear();
        self.state.selection.clear();
        self.state.retake_index = None;
        self.state.step = Step::Frame;
        tracing::debug!(layout = %id, "layout chosen");
        self.recompute_composite_if_ready();
    }

    /// String-keyed [`PhotoSession::choose_layout`]. Unknown ids leave the session untouched.
    pub fn choose_layout_by_id(&mut self, id: &str) -> PhotoStripResult<()> {
        let layout = layouts::lookup(id)?;
        self.choose_layout(layout.id);
        Ok(())
    }

    /// Set or skip the frame. Leaves the frame step for capture; in review the frame is swapped
    /// in place.
    pub fn choose_frame(&mut self, frame: Option<FrameId>) -> PhotoStripResult<()> {
        self.require_layout("choose a frame")?;
        self.state.frame = frame;
        if matches!(self.state.step, Step::Layout | Step::Frame) {
            self.state.step = Step::Capture;
        }
        tracing::debug!(frame = ?frame, "frame chosen");
        self.recompute_composite_if_ready();
        Ok(())
    }

    /// String-keyed [`PhotoSession::choose_frame`]. Unknown ids leave the session untouched.
    pub fn choose_frame_by_id(&mut self, id: Option<&str>) -> PhotoStripResult<()> {
        let frame = id.map(|f| frames::lookup(f).map(|f| f.id)).transpose()?;
        self.choose_frame(frame)
    }

    /// Store a new capture, passed through the active filter.
    ///
    /// A pending retake replaces that photo in place (same id, next revision) instead of
    /// appending. Does not change the step.
    pub fn capture_photo(&mut self, raw: impl Into<Vec<u8>>) -> PhotoStripResult<PhotoId> {
        self.require_layout("capture a photo")?;
        if self.state.step != Step::Capture {
            return Err(PhotoStripError::precondition(format!(
                "capture is only possible in the capture step (now {})",
                self.state.step
            )));
        }
        if self.state.retake_index.is_none()
            && self.state.captured.len() >= self.config.max_captures
        {
            return Err(PhotoStripError::precondition(format!(
                "capture limit of {} photos reached",
                self.config.max_captures
            )));
        }

        let raw = raw.into();
        let image = match self.state.filter {
            FilterKind::None => raw,
            kind => apply_filter(&raw, kind),
        };
        let image = Arc::new(image);

        let id = match self.state.retake_index.take() {
            Some(idx) => {
                let photo = self.state.captured.get_mut(idx).ok_or_else(|| {
                    PhotoStripError::precondition(format!("retake slot {idx} no longer exists"))
                })?;
                photo.image = image;
                photo.captured_at = Instant::now();
                photo.revision += 1;
                tracing::debug!(slot = idx, id = %photo.id, revision = photo.revision, "photo retaken");
                photo.id
            }
            None => {
                let id = PhotoId(self.next_id);
                self.next_id += 1;
                self.state.captured.push(CapturedPhoto {
                    id,
                    image,
                    captured_at: Instant::now(),
                    revision: 0,
                });
                tracing::debug!(id = %id, count = self.state.captured.len(), "photo captured");
                id
            }
        };
        self.recompute_composite_if_ready();
        Ok(id)
    }

    /// Mark captured photo `slot` for replacement by the next capture and return to capture.
    pub fn retake(&mut self, slot: usize) -> PhotoStripResult<()> {
        self.require_layout("retake a photo")?;
        if slot >= self.state.captured.len() {
            return Err(PhotoStripError::precondition(format!(
                "retake slot {slot} out of range (have {} photos)",
                self.state.captured.len()
            )));
        }
        self.state.retake_index = Some(slot);
        self.state.step = Step::Capture;
        tracing::debug!(slot, "retake requested");
        Ok(())
    }

    /// Drop a capture and its selection entry.
    pub fn remove_photo(&mut self, id: PhotoId) -> PhotoStripResult<()> {
        let idx = self.index_of(id)?;
        self.state.captured.remove(idx);
        self.state.selection.retain(|s| *s != id);
        self.state.retake_index = match self.state.retake_index {
            Some(r) if r == idx => None,
            Some(r) if r > idx => Some(r - 1),
            other => other,
        };
        tracing::debug!(id = %id, "photo removed");
        self.recompute_composite_if_ready();
        Ok(())
    }

    /// Select or deselect `id`. Returns whether it is selected afterwards.
    ///
    /// Selecting into a full selection evicts the earliest-selected photo, so the selection never
    /// exceeds the layout's photo count.
    pub fn toggle_selection(&mut self, id: PhotoId) -> PhotoStripResult<bool> {
        let capacity = self.require_layout("select photos")?.photo_count;
        self.index_of(id)?;

        let selected = if let Some(pos) = self.state.selection.iter().position(|s| *s == id) {
            self.state.selection.remove(pos);
            false
        } else {
            if self.state.selection.len() >= capacity {
                let evicted = self.state.selection.remove(0);
                tracing::debug!(evicted = %evicted, "selection full, oldest entry evicted");
            }
            self.state.selection.push(id);
            true
        };
        self.recompute_composite_if_ready();
        Ok(selected)
    }

    /// Move to review once enough photos exist. An empty selection is pre-filled with the first
    /// photos in capture order.
    pub fn enter_review(&mut self) -> PhotoStripResult<()> {
        let need = self.require_layout("review")?.photo_count;
        if self.state.captured.len() < need {
            return Err(PhotoStripError::precondition(format!(
                "review needs {need} photos, have {}",
                self.state.captured.len()
            )));
        }
        if self.state.selection.is_empty() {
            self.state.selection = self.state.captured.iter().take(need).map(|p| p.id).collect();
        }
        self.state.retake_index = None;
        self.state.step = Step::Review;
        tracing::debug!("entered review");
        self.recompute_composite_if_ready();
        Ok(())
    }

    /// Go back from review to take more photos.
    pub fn resume_capture(&mut self) -> PhotoStripResult<()> {
        self.require_layout("resume capture")?;
        self.state.step = Step::Capture;
        Ok(())
    }

    /// Select the camera.
    pub fn set_facing_mode(&mut self, mode: FacingMode) {
        self.state.facing_mode = mode;
    }

    /// Switch cameras and return the new mode.
    pub fn flip_facing_mode(&mut self) -> FacingMode {
        self.state.facing_mode = self.state.facing_mode.flipped();
        self.state.facing_mode
    }

    /// Filter applied to subsequent captures. Existing photos are not touched.
    pub fn set_filter(&mut self, filter: FilterKind) {
        self.state.filter = filter;
    }

    /// Override the layout's natural orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) -> PhotoStripResult<()> {
        self.require_layout("set orientation")?;
        self.state.orientation = orientation;
        self.recompute_composite_if_ready();
        Ok(())
    }

    /// Back to the initial state. Photo ids keep counting up.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.composite = None;
        tracing::debug!("session reset");
    }

    /// Key of the composite the current inputs call for, if the selection fills every slot.
    pub fn composite_key(&self) -> Option<CompositeKey> {
        let layout = self.layout()?;
        if self.state.selection.len() != layout.photo_count {
            return None;
        }
        let photos = self
            .state
            .selection
            .iter()
            .map(|id| self.state.photo(*id).map(|p| (p.id, p.revision)))
            .collect::<Option<Vec<_>>>()?;
        Some(CompositeKey {
            layout: layout.id,
            orientation: self.state.orientation,
            frame: self.state.frame,
            photos,
        })
    }

    /// Snapshot of the inputs for an off-thread render, if a composite is due.
    pub fn composite_job(&self) -> Option<CompositeJob> {
        let key = self.composite_key()?;
        let photos = key
            .photos
            .iter()
            .map(|(id, _)| self.state.photo(*id).map(|p| Arc::clone(&p.image)))
            .collect::<Option<Vec<_>>>()?;
        Some(CompositeJob {
            key,
            photos,
            engine: Arc::clone(&self.engine),
        })
    }

    /// Install a composite rendered from `key`. Returns `false` and drops it when the session's
    /// inputs have moved on.
    pub fn accept_composite(&mut self, key: CompositeKey, output: CompositeOutput) -> bool {
        if self.composite_key().as_ref() != Some(&key) {
            tracing::debug!(key = key.fingerprint(), "stale composite discarded");
            return false;
        }
        self.composite = Some((key, output));
        true
    }

    /// Bring the cached composite in line with the current inputs.
    ///
    /// Clears it when the selection is incomplete, keeps it when the inputs are unchanged, and
    /// otherwise renders inline (or only clears, when `auto_composite` is off).
    pub fn recompute_composite_if_ready(&mut self) {
        let Some(key) = self.composite_key() else {
            if self.composite.take().is_some() {
                tracing::debug!("composite cleared");
            }
            return;
        };
        if self.composite.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }
        self.composite = None;
        if !self.config.auto_composite {
            return;
        }
        let Some(job) = self.composite_job() else {
            return;
        };
        match job.run() {
            Ok(output) => {
                tracing::debug!(key = key.fingerprint(), "composite recomputed");
                self.composite = Some((key, output));
            }
            Err(err) => tracing::warn!(error = %err, "composite render failed"),
        }
    }

    /// Hand the current composite to `sink`.
    pub fn deliver(&self, sink: &mut dyn OutputSink, meta: &DeliveryMeta) -> PhotoStripResult<()> {
        let output = self
            .composite()
            .ok_or_else(|| PhotoStripError::precondition("no composite to deliver"))?;
        sink.deliver(output, meta)
    }

    fn require_layout(&self, action: &str) -> PhotoStripResult<&'static Layout> {
        self.layout().ok_or_else(|| {
            PhotoStripError::precondition(format!("choose a layout before trying to {action}"))
        })
    }

    fn index_of(&self, id: PhotoId) -> PhotoStripResult<usize> {
        self.state
            .captured
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PhotoStripError::precondition(format!("unknown photo id {id}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/photo_session.rs"]
mod tests;
