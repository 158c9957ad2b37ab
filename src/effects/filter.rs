use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assets::decode::{decode_image, unpremultiply_rgba8_in_place};
use crate::assets::encode::{OutputFormat, encode_luma, encode_rgba};
use crate::effects::composite::over_uniform_in_place;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::foundation::math::{Fnv1a64, Rng64};

const FILTER_JPEG_QUALITY: u8 = 95;
const TINT_ALPHA: u8 = 51;
const WARM_TINT: [u8; 3] = [255, 200, 150];
const COOL_TINT: [u8; 3] = [150, 200, 255];
const GRAIN_AMPLITUDE: u8 = 10;

/// Per-photo color filter applied at capture time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Identity.
    #[default]
    None,
    /// Translucent orange tint.
    Warm,
    /// Translucent blue tint.
    Cool,
    /// Rec. 601 luma written to every channel.
    Monochrome,
    /// Random per-channel noise in `-10..=10`.
    Grain,
}

impl FilterKind {
    /// Every filter, in presentation order.
    pub const ALL: [FilterKind; 5] = [
        FilterKind::None,
        FilterKind::Warm,
        FilterKind::Cool,
        FilterKind::Monochrome,
        FilterKind::Grain,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Monochrome => "monochrome",
            Self::Grain => "grain",
        }
    }

    /// Whether two applications to the same input always agree.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Self::Grain)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "normal" => Ok(Self::None),
            "warm" => Ok(Self::Warm),
            "cool" => Ok(Self::Cool),
            "monochrome" | "mono" | "bw" => Ok(Self::Monochrome),
            "grain" | "film" => Ok(Self::Grain),
            other => Err(PhotoStripError::validation(format!(
                "unknown filter '{other}' (expected none, warm, cool, monochrome or grain)"
            ))),
        }
    }
}

/// Apply `kind` to one encoded photo and re-encode it in the same container format.
///
/// Never fails: undecodable input, or output that cannot be re-encoded, yields the input
/// bytes unchanged. Grain draws a fresh seed on every call.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn apply_filter(bytes: &[u8], kind: FilterKind) -> Vec<u8> {
    let seed = if kind == FilterKind::Grain {
        fresh_seed()
    } else {
        0
    };
    apply_filter_seeded(bytes, kind, seed)
}

/// Like [`apply_filter`], with the grain noise drawn from `seed`.
pub fn apply_filter_seeded(bytes: &[u8], kind: FilterKind, seed: u64) -> Vec<u8> {
    if kind == FilterKind::None {
        return bytes.to_vec();
    }
    match try_apply(bytes, kind, seed) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(filter = %kind, error = %err, "filter skipped, keeping unfiltered photo");
            bytes.to_vec()
        }
    }
}

fn try_apply(bytes: &[u8], kind: FilterKind, seed: u64) -> PhotoStripResult<Vec<u8>> {
    let format = OutputFormat::sniff(bytes);
    let img = decode_image(bytes)?;
    let mut px = img.rgba8_premul;
    filter_premul_in_place(&mut px, kind, seed);
    unpremultiply_rgba8_in_place(&mut px);

    if kind == FilterKind::Monochrome && format == OutputFormat::Jpeg {
        // Single channel keeps R = G = B exact through the lossy codec.
        let luma: Vec<u8> = px.chunks_exact(4).map(|p| p[0]).collect();
        let gray = image::GrayImage::from_raw(img.width, img.height, luma)
            .ok_or_else(|| PhotoStripError::render("luma buffer size mismatch"))?;
        return encode_luma(&gray, format, FILTER_JPEG_QUALITY);
    }

    let rgba = image::RgbaImage::from_raw(img.width, img.height, px)
        .ok_or_else(|| PhotoStripError::render("rgba buffer size mismatch"))?;
    encode_rgba(&rgba, format, FILTER_JPEG_QUALITY)
}

/// Apply `kind` to a premultiplied RGBA8 buffer.
pub fn filter_premul_in_place(rgba8_premul: &mut [u8], kind: FilterKind, seed: u64) {
    match kind {
        FilterKind::None => {}
        FilterKind::Warm => tint_in_place(rgba8_premul, WARM_TINT),
        FilterKind::Cool => tint_in_place(rgba8_premul, COOL_TINT),
        FilterKind::Monochrome => monochrome_in_place(rgba8_premul),
        FilterKind::Grain => grain_in_place(rgba8_premul, &mut Rng64::new(seed), GRAIN_AMPLITUDE),
    }
}

/// Rec. 601 luma of one pixel, rounded to nearest.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

fn monochrome_in_place(px: &mut [u8]) {
    // Luma is linear, so it commutes with premultiplication.
    for p in px.chunks_exact_mut(4) {
        let y = luma(p[0], p[1], p[2]).min(p[3]);
        p[0] = y;
        p[1] = y;
        p[2] = y;
    }
}

fn tint_in_place(px: &mut [u8], tint: [u8; 3]) {
    let color = Rgba8Premul::from_straight_rgba(tint[0], tint[1], tint[2], TINT_ALPHA);
    over_uniform_in_place(px, color.to_array());
}

fn grain_in_place(px: &mut [u8], rng: &mut Rng64, amp: u8) {
    for p in px.chunks_exact_mut(4) {
        let a = i16::from(p[3]);
        for c in &mut p[..3] {
            *c = (i16::from(*c) + rng.next_offset(amp)).clamp(0, a) as u8;
        }
    }
}

fn fresh_seed() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut h = Fnv1a64::new_default();
    h.write_u64(nanos);
    h.write_u64(COUNTER.fetch_add(1, Ordering::Relaxed));
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
