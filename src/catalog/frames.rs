use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{PhotoStripError, PhotoStripResult};

/// Frame grouping shown by the frame picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameCategory {
    /// Pop icon themed frames (premium).
    PopIcon,
    /// Aesthetic frames.
    Aesthetic,
    /// Seasonal and event frames.
    Seasonal,
    /// Plain classic frames.
    Classic,
}

impl FrameCategory {
    /// Every category in picker order.
    pub const ALL: [FrameCategory; 4] = [
        FrameCategory::PopIcon,
        FrameCategory::Aesthetic,
        FrameCategory::Seasonal,
        FrameCategory::Classic,
    ];

    /// Stable string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopIcon => "pop-icon",
            Self::Aesthetic => "aesthetic",
            Self::Seasonal => "seasonal",
            Self::Classic => "classic",
        }
    }
}

impl fmt::Display for FrameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameCategory {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        FrameCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| PhotoStripError::validation(format!("unknown frame category '{s}'")))
    }
}

/// Closed set of frame identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameId {
    /// `ribbon-pastel`
    RibbonPastel,
    /// `sparkle-dreams`
    SparkleDreams,
    /// `film-grain-vibe`
    FilmGrainVibe,
    /// `taylor-swift`
    TaylorSwift,
    /// `sabrina-carpenter`
    SabrinaCarpenter,
    /// `olivia-rodrigo`
    OliviaRodrigo,
    /// `valentines`
    Valentines,
    /// `spotify-wrapped`
    SpotifyWrapped,
    /// `classic-white`
    ClassicWhite,
}

impl FrameId {
    /// Stable string id.
    pub fn as_str(self) -> &'static str {
        get(self).slug
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameId {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        FRAMES
            .iter()
            .find(|f| f.slug == s)
            .map(|f| f.id)
            .ok_or_else(|| PhotoStripError::unknown_frame(s))
    }
}

/// Immutable decorative overlay descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Catalog id.
    pub id: FrameId,
    slug: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Picker category.
    pub category: FrameCategory,
    /// Relative path of the thumbnail shown by the picker.
    pub preview: &'static str,
    /// Relative path of the transparent overlay drawn over the composite.
    pub overlay: &'static str,
    /// Requires an unlocked account.
    pub premium: bool,
}

impl Frame {
    /// Overlay is vector data rasterized at canvas size.
    pub fn overlay_is_svg(&self) -> bool {
        self.overlay.ends_with(".svg")
    }
}

macro_rules! frame {
    ($id:ident, $slug:literal, $name:literal, $cat:ident, $file:literal, $premium:literal) => {
        Frame {
            id: FrameId::$id,
            slug: $slug,
            name: $name,
            category: FrameCategory::$cat,
            preview: concat!("frames/preview/", $file, ".png"),
            overlay: concat!("frames/", $file, ".svg"),
            premium: $premium,
        }
    };
}

// Indexed by `FrameId as usize`.
static FRAMES: [Frame; 9] = [
    frame!(RibbonPastel, "ribbon-pastel", "Ribbon Pastel", Aesthetic, "ribbon-pastel", false),
    frame!(SparkleDreams, "sparkle-dreams", "Sparkle Dreams", Aesthetic, "sparkle-dreams", false),
    frame!(FilmGrainVibe, "film-grain-vibe", "Film Grain Vibe", Aesthetic, "film-grain", false),
    frame!(TaylorSwift, "taylor-swift", "Taylor Swift Era", PopIcon, "taylor-swift", true),
    frame!(SabrinaCarpenter, "sabrina-carpenter", "Sabrina Carpenter", PopIcon, "sabrina", true),
    frame!(OliviaRodrigo, "olivia-rodrigo", "Olivia Rodrigo", PopIcon, "olivia", true),
    frame!(Valentines, "valentines", "Valentine's Day", Seasonal, "valentines", false),
    frame!(SpotifyWrapped, "spotify-wrapped", "Spotify Wrapped", Seasonal, "spotify", true),
    frame!(ClassicWhite, "classic-white", "Classic White", Classic, "classic-white", false),
];

/// Look up a frame by id.
pub fn get(id: FrameId) -> &'static Frame {
    &FRAMES[id as usize]
}

/// Look up a frame by its string id.
pub fn lookup(id: &str) -> PhotoStripResult<&'static Frame> {
    Ok(get(id.parse()?))
}

/// All frames in catalog order.
pub fn list_all() -> &'static [Frame] {
    &FRAMES
}

/// Frames of one category, in catalog order.
pub fn list_by_category(category: FrameCategory) -> impl Iterator<Item = &'static Frame> {
    FRAMES.iter().filter(move |f| f.category == category)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/frames.rs"]
mod tests;
