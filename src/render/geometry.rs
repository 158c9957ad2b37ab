use kurbo::Shape;

use crate::catalog::layouts::{Layout, LayoutKind};
use crate::config::EngineConfig;
use crate::foundation::core::{Canvas, Rect, RoundedRect};

/// One photo slot on the canvas, in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotRect {
    /// Slot bounds in canvas pixels.
    pub rect: Rect,
    /// Corner radius, clamped when drawn.
    pub radius: f64,
}

impl SlotRect {
    /// Rounded outline with the radius clamped to half the short side.
    pub fn rounded(&self) -> RoundedRect {
        let max = 0.5 * self.rect.width().min(self.rect.height());
        RoundedRect::from_rect(self.rect, self.radius.clamp(0.0, max.max(0.0)))
    }

    /// Integer pixel window `(x, y, width, height)` covered by the slot.
    pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
        let x0 = self.rect.x0.round().max(0.0) as u32;
        let y0 = self.rect.y0.round().max(0.0) as u32;
        let x1 = self.rect.x1.round().max(0.0) as u32;
        let y1 = self.rect.y1.round().max(0.0) as u32;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Whether the center of pixel `(x, y)` lies inside the rounded outline.
    pub fn covers_pixel(&self, x: u32, y: u32) -> bool {
        let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        let r = &self.rect;
        if px < r.x0 || px > r.x1 || py < r.y0 || py > r.y1 {
            return false;
        }
        let rounded = self.rounded();
        let radius = rounded.radii().top_left;
        // Only the four corner squares need the exact test.
        let inner_x = px >= r.x0 + radius && px <= r.x1 - radius;
        let inner_y = py >= r.y0 + radius && py <= r.y1 - radius;
        if inner_x || inner_y {
            return true;
        }
        rounded.contains((px, py).into())
    }
}

/// Slot rectangles for `layout` on `canvas`, in slot order.
///
/// Pure function of its inputs. Slots never overlap and always lie inside the canvas.
pub fn slot_rects(layout: &Layout, canvas: Canvas, cfg: &EngineConfig) -> Vec<SlotRect> {
    match layout.kind {
        LayoutKind::Strip => strip_slots(layout.photo_count, canvas, cfg),
        LayoutKind::Grid { columns, rows } => grid_slots(columns, rows, canvas, cfg),
    }
}

fn strip_slots(count: usize, canvas: Canvas, cfg: &EngineConfig) -> Vec<SlotRect> {
    if count == 0 {
        return Vec::new();
    }
    // Lay the strip out along the long axis, then transpose back for landscape canvases.
    let transposed = canvas.width > canvas.height;
    let (across, along) = if transposed {
        (f64::from(canvas.height), f64::from(canvas.width))
    } else {
        (f64::from(canvas.width), f64::from(canvas.height))
    };
    let n = count as f64;

    let mut slot_across = across * cfg.strip_width_ratio;
    let mut slot_along = slot_across * cfg.photo_aspect;
    let min_gap = along * cfg.min_strip_gap_ratio;
    if n * slot_along + (n + 1.0) * min_gap > along {
        slot_along = ((along - (n + 1.0) * min_gap) / n).max(0.0);
        slot_across = slot_along / cfg.photo_aspect;
    }
    let gap = (along - n * slot_along) / (n + 1.0);
    let offset = (across - slot_across) / 2.0;

    (0..count)
        .map(|i| {
            let start = gap + (i as f64) * (slot_along + gap);
            let rect = if transposed {
                Rect::new(start, offset, start + slot_along, offset + slot_across)
            } else {
                Rect::new(offset, start, offset + slot_across, start + slot_along)
            };
            SlotRect {
                rect,
                radius: cfg.strip_corner_radius,
            }
        })
        .collect()
}

fn grid_slots(columns: u32, rows: u32, canvas: Canvas, cfg: &EngineConfig) -> Vec<SlotRect> {
    if columns == 0 || rows == 0 {
        return Vec::new();
    }
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let pad = w * cfg.grid_padding_ratio;
    let cell_w = ((w - f64::from(columns + 1) * pad) / f64::from(columns)).max(0.0);
    let cell_h = ((h - f64::from(rows + 1) * pad) / f64::from(rows)).max(0.0);

    (0..columns * rows)
        .map(|i| {
            let col = f64::from(i % columns);
            let row = f64::from(i / columns);
            let x = pad + col * (cell_w + pad);
            let y = pad + row * (cell_h + pad);
            SlotRect {
                rect: Rect::new(x, y, x + cell_w, y + cell_h),
                radius: cfg.grid_corner_radius,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
