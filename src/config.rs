//! JSON-loadable configuration for the composite engine and the session.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::assets::encode::OutputFormat;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{PhotoStripError, PhotoStripResult};

/// Opaque sRGB color written as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl HexColor {
    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque premultiplied pixel.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, 255)
    }
}

impl FromStr for HexColor {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PhotoStripError::validation(format!(
                "color must be #RRGGBB, got '{s}'"
            )));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                PhotoStripError::validation(format!("invalid hex byte '{}'", &hex[i..i + 2]))
            })
        };
        Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = PhotoStripError;

    fn try_from(s: String) -> PhotoStripResult<Self> {
        s.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Rendering parameters for [`crate::CompositeEngine`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Canvas fill behind the slots.
    pub background: HexColor,
    /// Container of the composite output.
    pub output_format: OutputFormat,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
    /// Strip slot width as a fraction of canvas width.
    pub strip_width_ratio: f64,
    /// Slot height divided by slot width for strip layouts.
    pub photo_aspect: f64,
    /// Smallest vertical gap between strip slots, as a fraction of canvas height.
    pub min_strip_gap_ratio: f64,
    /// Grid padding around and between cells, as a fraction of canvas width.
    pub grid_padding_ratio: f64,
    /// Corner radius of strip slots in pixels.
    pub strip_corner_radius: f64,
    /// Corner radius of grid cells in pixels.
    pub grid_corner_radius: f64,
    /// Worker threads for decoding; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            background: HexColor::rgb(0xFF, 0xF5, 0xF5),
            output_format: OutputFormat::Jpeg,
            jpeg_quality: 95,
            strip_width_ratio: 0.85,
            photo_aspect: 1.2,
            min_strip_gap_ratio: 0.01,
            grid_padding_ratio: 0.05,
            strip_corner_radius: 20.0,
            grid_corner_radius: 15.0,
            threads: None,
        }
    }
}

impl EngineConfig {
    /// Parse from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotoStripResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PhotoStripError::validation(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PhotoStripResult<Self> {
        Self::from_reader(open_json(path.as_ref(), "engine config")?)
    }

    /// Reject values the renderer cannot honor.
    pub fn validate(&self) -> PhotoStripResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PhotoStripError::validation(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        check_ratio("strip_width_ratio", self.strip_width_ratio)?;
        check_ratio("min_strip_gap_ratio", self.min_strip_gap_ratio)?;
        check_ratio("grid_padding_ratio", self.grid_padding_ratio)?;
        if self.grid_padding_ratio >= 1.0 / 3.0 {
            return Err(PhotoStripError::validation(
                "grid_padding_ratio must leave room for two cells (< 1/3)",
            ));
        }
        if !(self.photo_aspect.is_finite() && self.photo_aspect > 0.0) {
            return Err(PhotoStripError::validation("photo_aspect must be finite and > 0"));
        }
        for (name, r) in [
            ("strip_corner_radius", self.strip_corner_radius),
            ("grid_corner_radius", self.grid_corner_radius),
        ] {
            if !(r.is_finite() && r >= 0.0) {
                return Err(PhotoStripError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(PhotoStripError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }
}

/// Settings for one [`crate::PhotoSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Upper bound on captured photos held at once.
    pub max_captures: usize,
    /// Render the composite inline after each mutation. When off, callers drive
    /// [`crate::PhotoSession::composite_job`] themselves.
    pub auto_composite: bool,
    /// Composite engine settings.
    pub engine: EngineConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_captures: 8,
            auto_composite: true,
            engine: EngineConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse JSON from a reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotoStripResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PhotoStripError::validation(format!("parse session config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> PhotoStripResult<Self> {
        Self::from_reader(open_json(path.as_ref(), "session config")?)
    }

    /// Reject values the session cannot honor.
    pub fn validate(&self) -> PhotoStripResult<()> {
        if self.max_captures == 0 {
            return Err(PhotoStripError::validation("max_captures must be >= 1"));
        }
        self.engine.validate()
    }
}

fn open_json(path: &Path, what: &str) -> PhotoStripResult<BufReader<File>> {
    let f = File::open(path).map_err(|e| {
        PhotoStripError::validation(format!("open {what} JSON '{}': {e}", path.display()))
    })?;
    Ok(BufReader::new(f))
}

fn check_ratio(name: &str, v: f64) -> PhotoStripResult<()> {
    if v.is_finite() && v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(PhotoStripError::validation(format!(
            "{name} must be in (0, 1], got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
