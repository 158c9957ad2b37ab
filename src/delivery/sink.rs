use std::path::PathBuf;

use anyhow::Context;

use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::render::engine::CompositeOutput;

/// Outbound metadata attached to a delivered composite.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeliveryMeta {
    /// Unix milliseconds used for the download name.
    pub timestamp_ms: u64,
    /// Share target such as an email address.
    pub recipient: Option<String>,
    /// Share platform such as `instagram`.
    pub platform: Option<String>,
}

impl DeliveryMeta {
    /// Metadata stamped with `timestamp_ms` (Unix milliseconds).
    pub fn at(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    /// Attach a recipient address.
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Attach a sharing platform name.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Consumer of finished composites (download, persistence or sharing).
pub trait OutputSink: Send {
    /// Hand one composite to the collaborator.
    fn deliver(&mut self, output: &CompositeOutput, meta: &DeliveryMeta) -> PhotoStripResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) deliveries: Vec<(CompositeOutput, DeliveryMeta)>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered composites in arrival order.
    pub fn deliveries(&self) -> &[(CompositeOutput, DeliveryMeta)] {
        &self.deliveries
    }
}

impl OutputSink for InMemorySink {
    fn deliver(&mut self, output: &CompositeOutput, meta: &DeliveryMeta) -> PhotoStripResult<()> {
        self.deliveries.push((output.clone(), meta.clone()));
        Ok(())
    }
}

/// Writes each composite into a directory under its download name.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Sink writing into `dir`, created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
            written: Vec::new(),
        }
    }

    /// Replace existing files instead of failing.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for DirectorySink {
    fn deliver(&mut self, output: &CompositeOutput, meta: &DeliveryMeta) -> PhotoStripResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(output.download_name(meta.timestamp_ms));
        if path.exists() && !self.overwrite {
            return Err(PhotoStripError::validation(format!(
                "output exists: {} (enable overwrite)",
                path.display()
            )));
        }
        std::fs::write(&path, output.bytes.as_slice())
            .with_context(|| format!("write composite to '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = output.bytes.len(), "composite written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/delivery/sink.rs"]
mod tests;
