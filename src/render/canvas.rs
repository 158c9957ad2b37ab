use crate::assets::decode::{PreparedImage, cover_resize, unpremultiply_rgba8_in_place};
use crate::effects::composite::{over, over_in_place};
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{PhotoStripError, PhotoStripResult};
use crate::render::geometry::SlotRect;

const MAX_CANVAS_DIM: u32 = 16_384;

/// Premultiplied RGBA8 raster the composite is painted into.
#[derive(Clone, Debug)]
pub struct CanvasBuffer {
    canvas: Canvas,
    data: Vec<u8>,
}

impl CanvasBuffer {
    /// Allocate `canvas` filled with `background`.
    pub fn filled(canvas: Canvas, background: Rgba8Premul) -> PhotoStripResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(PhotoStripError::render("canvas has zero width or height"));
        }
        if canvas.width > MAX_CANVAS_DIM || canvas.height > MAX_CANVAS_DIM {
            return Err(PhotoStripError::render(format!(
                "canvas too large: {}x{} (max {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM})",
                canvas.width, canvas.height
            )));
        }
        let px = background.to_array();
        let data = px.repeat(canvas.pixel_count());
        Ok(Self { canvas, data })
    }

    /// Cover-fit `photo` into `slot` and paint it clipped to the slot's rounded outline.
    pub fn draw_photo(&mut self, slot: &SlotRect, photo: &PreparedImage) -> PhotoStripResult<()> {
        let (x0, y0, w, h) = slot.pixel_bounds();
        let w = w.min(self.canvas.width.saturating_sub(x0));
        let h = h.min(self.canvas.height.saturating_sub(y0));
        if w == 0 || h == 0 {
            return Ok(());
        }
        let fitted = cover_resize(photo, w, h)?;
        for dy in 0..h {
            for dx in 0..w {
                let (x, y) = (x0 + dx, y0 + dy);
                if !slot.covers_pixel(x, y) {
                    continue;
                }
                let i = self.index(x, y);
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                let out = over(dst, fitted.pixel(dx, dy), 1.0);
                self.data[i..i + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }

    /// Paint a full-canvas overlay on top of everything drawn so far.
    pub fn draw_overlay(&mut self, overlay: &PreparedImage) -> PhotoStripResult<()> {
        if overlay.width != self.canvas.width || overlay.height != self.canvas.height {
            return Err(PhotoStripError::render(format!(
                "overlay is {}x{}, canvas is {}x{}",
                overlay.width, overlay.height, self.canvas.width, self.canvas.height
            )));
        }
        over_in_place(&mut self.data, &overlay.rgba8_premul, 1.0)
    }

    /// Convert to a straight-alpha image ready for encoding.
    pub fn into_rgba_image(self) -> PhotoStripResult<image::RgbaImage> {
        let mut data = self.data;
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, data)
            .ok_or_else(|| PhotoStripError::render("canvas buffer size mismatch"))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
