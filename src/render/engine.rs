use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{PreparedImage, decode_image, decode_overlay};
use crate::assets::encode::{OutputFormat, encode_rgba};
use crate::assets::source::{AssetSource, BundledAssets};
use crate::catalog::frames::{self, FrameId};
use crate::catalog::layouts::{self, LayoutType};
use crate::config::EngineConfig;
use crate::foundation::core::{Canvas, Orientation};
use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::render::canvas::CanvasBuffer;
use crate::render::geometry::slot_rects;

/// An encoded composite image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeOutput {
    /// Encoded bytes, shared cheaply with delivery collaborators.
    pub bytes: Arc<Vec<u8>>,
    /// Container the bytes are encoded in.
    pub format: OutputFormat,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl CompositeOutput {
    /// Suggested file name for a download started at `timestamp_ms` (Unix milliseconds).
    pub fn download_name(&self, timestamp_ms: u64) -> String {
        format!("photostrip-{timestamp_ms}.{}", self.format.extension())
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Canvas the output was rendered at.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }
}

/// Renders selected photos into a single styled image.
///
/// The engine is stateless between calls: the same inputs always produce the same bytes.
pub struct CompositeEngine {
    config: EngineConfig,
    assets: Arc<dyn AssetSource>,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for CompositeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeEngine")
            .field("config", &self.config)
            .field("dedicated_pool", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

impl CompositeEngine {
    /// Engine reading frame overlays from the bundled assets.
    pub fn new(config: EngineConfig) -> PhotoStripResult<Self> {
        Self::with_assets(config, Arc::new(BundledAssets))
    }

    /// Engine reading frame overlays from `assets`.
    pub fn with_assets(config: EngineConfig, assets: Arc<dyn AssetSource>) -> PhotoStripResult<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(n) => Some(build_thread_pool(n)?),
            None => None,
        };
        Ok(Self {
            config,
            assets,
            pool,
        })
    }

    /// Configuration the engine renders with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compose `photos` (encoded images, in slot order) into `layout` at `orientation`.
    ///
    /// Photos that fail to decode leave their slot blank and a frame overlay that fails to load
    /// is skipped; both are logged. Only an invalid canvas or an encoding failure is an error.
    #[tracing::instrument(skip(self, photos), fields(photos = photos.len()))]
    pub fn compose<P>(
        &self,
        layout: LayoutType,
        orientation: Orientation,
        photos: &[P],
        frame: Option<FrameId>,
    ) -> PhotoStripResult<CompositeOutput>
    where
        P: AsRef<[u8]> + Sync,
    {
        let layout = layouts::get(layout);
        let canvas = layout.canvas(orientation);
        let mut buf = CanvasBuffer::filled(canvas, self.config.background.to_premul())?;
        let slots = slot_rects(layout, canvas, &self.config);

        if photos.len() > slots.len() {
            tracing::warn!(
                given = photos.len(),
                slots = slots.len(),
                "more photos than slots, extra photos ignored"
            );
        }
        let photos = &photos[..photos.len().min(slots.len())];

        let (overlay, decoded) = self.run(|| {
            rayon::join(
                || frame.and_then(|id| self.load_overlay(id, canvas)),
                || {
                    photos
                        .par_iter()
                        .map(|p| decode_image(p.as_ref()))
                        .collect::<Vec<_>>()
                },
            )
        });

        for (idx, (slot, photo)) in slots.iter().zip(decoded).enumerate() {
            match photo {
                Ok(img) => buf.draw_photo(slot, &img)?,
                Err(err) => tracing::warn!(slot = idx, error = %err, "photo decode failed, slot left blank"),
            }
        }

        if let Some(overlay) = overlay
            && let Err(err) = buf.draw_overlay(&overlay)
        {
            tracing::warn!(error = %err, "frame overlay skipped");
        }

        let img = buf.into_rgba_image()?;
        let bytes = encode_rgba(&img, self.config.output_format, self.config.jpeg_quality)
            .map_err(|e| PhotoStripError::render(format!("encode composite: {e}")))?;
        Ok(CompositeOutput {
            bytes: Arc::new(bytes),
            format: self.config.output_format,
            width: canvas.width,
            height: canvas.height,
        })
    }

    /// String-keyed form of [`CompositeEngine::compose`].
    ///
    /// Unknown ids fail before any work is done.
    pub fn compose_by_id<P>(
        &self,
        layout: &str,
        orientation: Orientation,
        photos: &[P],
        frame: Option<&str>,
    ) -> PhotoStripResult<CompositeOutput>
    where
        P: AsRef<[u8]> + Sync,
    {
        let layout = layouts::lookup(layout)?.id;
        let frame = frame.map(|f| frames::lookup(f).map(|f| f.id)).transpose()?;
        self.compose(layout, orientation, photos, frame)
    }

    fn load_overlay(&self, id: FrameId, canvas: Canvas) -> Option<PreparedImage> {
        let frame = frames::get(id);
        let loaded = self
            .assets
            .load(frame.overlay)
            .and_then(|bytes| decode_overlay(&bytes, frame.overlay_is_svg(), canvas));
        match loaded {
            Ok(img) => Some(img),
            Err(err) => {
                tracing::warn!(frame = %id, error = %err, "frame overlay failed to load");
                None
            }
        }
    }

    fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

fn build_thread_pool(threads: usize) -> PhotoStripResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(PhotoStripError::validation("threads must be >= 1 when set"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PhotoStripError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
