use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Canvas, Orientation};
use crate::foundation::error::{PhotoStripError, PhotoStripResult};

/// Closed set of layout identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayoutType {
    /// Classic three-photo vertical strip.
    #[serde(rename = "3-strip")]
    ThreeStrip,
    /// Four-photo vertical strip.
    #[serde(rename = "4-strip")]
    FourStrip,
    /// Four-cut multi frame (2x2, portrait).
    #[serde(rename = "4-collage")]
    FourCollage,
    /// 2x2 grid (landscape).
    #[serde(rename = "2x2-grid")]
    Grid2x2,
}

impl LayoutType {
    /// Every layout id in catalog order.
    pub const ALL: [LayoutType; 4] = [
        LayoutType::ThreeStrip,
        LayoutType::FourStrip,
        LayoutType::FourCollage,
        LayoutType::Grid2x2,
    ];

    /// Stable string id (`3-strip`, `2x2-grid`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeStrip => "3-strip",
            Self::FourStrip => "4-strip",
            Self::FourCollage => "4-collage",
            Self::Grid2x2 => "2x2-grid",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::ThreeStrip => 0,
            Self::FourStrip => 1,
            Self::FourCollage => 2,
            Self::Grid2x2 => 3,
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = PhotoStripError;

    fn from_str(s: &str) -> PhotoStripResult<Self> {
        LayoutType::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PhotoStripError::unknown_layout(s))
    }
}

/// Slot arrangement family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    /// Single column of photos stacked top to bottom.
    Strip,
    /// Row-major grid of equally sized cells.
    Grid {
        /// Column count.
        columns: u32,
        /// Row count.
        rows: u32,
    },
}

/// Immutable layout descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Catalog id.
    pub id: LayoutType,
    /// Display name.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Physical print size label.
    pub print_size: &'static str,
    /// Declared orientation.
    pub orientation: Orientation,
    /// Number of slots.
    pub photo_count: usize,
    /// Nominal canvas width in pixels (unrotated).
    pub width: u32,
    /// Nominal canvas height in pixels (unrotated).
    pub height: u32,
    /// Slot arrangement.
    pub kind: LayoutKind,
}

impl Layout {
    /// Canvas for this layout rendered in `orientation`.
    pub fn canvas(&self, orientation: Orientation) -> Canvas {
        Canvas::new(self.width, self.height).oriented(orientation)
    }

    /// Canvas in the layout's declared orientation.
    pub fn nominal_canvas(&self) -> Canvas {
        self.canvas(self.orientation)
    }
}

// Nominal sizes are the print sizes at 300 dpi.
static LAYOUTS: [Layout; 4] = [
    Layout {
        id: LayoutType::ThreeStrip,
        name: "3-CUT Strip",
        description: "Classic 3-photo vertical strip",
        print_size: "2\" x 6\"",
        orientation: Orientation::Portrait,
        photo_count: 3,
        width: 600,
        height: 1800,
        kind: LayoutKind::Strip,
    },
    Layout {
        id: LayoutType::FourStrip,
        name: "4-CUT Strip",
        description: "Standard 4-photo vertical strip",
        print_size: "2\" x 8\"",
        orientation: Orientation::Portrait,
        photo_count: 4,
        width: 600,
        height: 2400,
        kind: LayoutKind::Strip,
    },
    Layout {
        id: LayoutType::FourCollage,
        name: "4-CUT Multi Frame",
        description: "4-photo multi-frame",
        print_size: "4\" x 5\"",
        orientation: Orientation::Portrait,
        photo_count: 4,
        width: 1200,
        height: 1500,
        kind: LayoutKind::Grid {
            columns: 2,
            rows: 2,
        },
    },
    Layout {
        id: LayoutType::Grid2x2,
        name: "2x2 Grid",
        description: "Instagram-friendly 2x2 grid",
        print_size: "6\" x 4\"",
        orientation: Orientation::Landscape,
        photo_count: 4,
        width: 1800,
        height: 1200,
        kind: LayoutKind::Grid {
            columns: 2,
            rows: 2,
        },
    },
];

/// Look up a layout by id.
pub fn get(id: LayoutType) -> &'static Layout {
    &LAYOUTS[id.index()]
}

/// Look up a layout by its string id.
pub fn lookup(id: &str) -> PhotoStripResult<&'static Layout> {
    Ok(get(id.parse()?))
}

/// All layouts in catalog order.
pub fn all() -> &'static [Layout] {
    &LAYOUTS
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/layouts.rs"]
mod tests;
