use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{PhotoStripError, PhotoStripResult};

/// Read-only provider of frame overlay (and preview) bytes keyed by relative path.
pub trait AssetSource: Send + Sync {
    /// Load the bytes stored at relative `path`.
    fn load(&self, path: &str) -> PhotoStripResult<Vec<u8>>;
}

/// Frame overlays compiled into the library.
#[derive(Clone, Copy, Debug, Default)]
pub struct BundledAssets;

macro_rules! bundled {
    ($($file:literal),* $(,)?) => {
        &[$((concat!("frames/", $file), include_bytes!(concat!("../../assets/frames/", $file)) as &[u8])),*]
    };
}

static BUNDLED: &[(&str, &[u8])] = bundled![
    "ribbon-pastel.svg",
    "sparkle-dreams.svg",
    "film-grain.svg",
    "taylor-swift.svg",
    "sabrina.svg",
    "olivia.svg",
    "valentines.svg",
    "spotify.svg",
    "classic-white.svg",
];

impl AssetSource for BundledAssets {
    fn load(&self, path: &str) -> PhotoStripResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        BUNDLED
            .iter()
            .find(|(p, _)| *p == norm)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| PhotoStripError::validation(format!("no bundled asset at '{norm}'")))
    }
}

/// Assets read from a directory on disk.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    /// Serve assets below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssetSource {
    fn load(&self, path: &str) -> PhotoStripResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(PhotoStripError::from)
    }
}

/// In-memory assets, mostly for tests and embedders that ship their own overlays.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` at `path`, replacing any previous entry.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) -> PhotoStripResult<()> {
        let norm = normalize_rel_path(path)?;
        self.files.insert(norm, bytes.into());
        Ok(())
    }

    /// Builder form of [`MemoryAssetSource::insert`].
    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> PhotoStripResult<Self> {
        self.insert(path, bytes)?;
        Ok(self)
    }
}

impl AssetSource for MemoryAssetSource {
    fn load(&self, path: &str) -> PhotoStripResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        self.files
            .get(&norm)
            .cloned()
            .ok_or_else(|| PhotoStripError::validation(format!("no asset at '{norm}'")))
    }
}

/// Normalize a relative asset path to `a/b/c` form, rejecting absolute paths and `..`.
pub fn normalize_rel_path(source: &str) -> PhotoStripResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PhotoStripError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PhotoStripError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PhotoStripError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PhotoStripError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
