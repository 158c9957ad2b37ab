use anyhow::Context;
use image::imageops::FilterType;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PhotoStripError, PhotoStripResult};

// Largest accepted side, enforced from the header before any pixel buffer is allocated.
const MAX_DIM: u32 = 16_384;

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

impl PreparedImage {
    /// Premultiplied RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.rgba8_premul[idx],
            self.rgba8_premul[idx + 1],
            self.rgba8_premul[idx + 2],
            self.rgba8_premul[idx + 3],
        ]
    }

    fn into_rgba_image(self) -> PhotoStripResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8_premul)
            .ok_or_else(|| PhotoStripError::render("prepared image buffer size mismatch"))
    }

    fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba8_premul: img.into_raw(),
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PhotoStripResult<PreparedImage> {
    let mut reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .context("sniff image format")?;
    reader.limits(decode_limits());
    let dyn_img = reader.decode().context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    check_dims(width, height)?;

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul,
    })
}

/// Decode a frame overlay and stretch it to exactly `canvas`.
///
/// SVG overlays are rasterized directly at canvas size; raster overlays are resampled.
pub fn decode_overlay(bytes: &[u8], is_svg: bool, canvas: Canvas) -> PhotoStripResult<PreparedImage> {
    if is_svg {
        return rasterize_svg(bytes, canvas);
    }
    let img = decode_image(bytes)?;
    if img.width == canvas.width && img.height == canvas.height {
        return Ok(img);
    }
    let stretched = image::imageops::resize(
        &img.into_rgba_image()?,
        canvas.width,
        canvas.height,
        FilterType::Triangle,
    );
    Ok(PreparedImage::from_rgba_image(stretched))
}

/// Rasterize SVG bytes into a premultiplied RGBA8 image of exactly `canvas` size.
pub fn rasterize_svg(bytes: &[u8], canvas: Canvas) -> PhotoStripResult<PreparedImage> {
    check_dims(canvas.width, canvas.height)?;
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(PhotoStripError::validation("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| PhotoStripError::render("failed to allocate svg pixmap"))?;
    let sx = (canvas.width as f32) / size.width();
    let sy = (canvas.height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(PreparedImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: pixmap.take(),
    })
}

/// Scale `img` to fill `width`x`height` without letterboxing, cropping the overflow evenly.
pub fn cover_resize(img: &PreparedImage, width: u32, height: u32) -> PhotoStripResult<PreparedImage> {
    if width == 0 || height == 0 || img.width == 0 || img.height == 0 {
        return Err(PhotoStripError::render("cover target and source must be non-empty"));
    }

    let src_w = f64::from(img.width);
    let src_h = f64::from(img.height);
    let scale = (f64::from(width) / src_w).max(f64::from(height) / src_h);

    // Source window that maps onto the target after scaling.
    let crop_w = ((f64::from(width) / scale).round() as u32).clamp(1, img.width);
    let crop_h = ((f64::from(height) / scale).round() as u32).clamp(1, img.height);
    let crop_x = (img.width - crop_w) / 2;
    let crop_y = (img.height - crop_h) / 2;

    let src = img.clone().into_rgba_image()?;
    let cropped = image::imageops::crop_imm(&src, crop_x, crop_y, crop_w, crop_h).to_image();
    let resized = image::imageops::resize(&cropped, width, height, FilterType::Triangle);
    Ok(PreparedImage::from_rgba_image(resized))
}

fn decode_limits() -> image::Limits {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_DIM);
    limits.max_image_height = Some(MAX_DIM);
    limits
}

fn check_dims(width: u32, height: u32) -> PhotoStripResult<()> {
    if width == 0 || height == 0 {
        return Err(PhotoStripError::render("image has zero width or height"));
    }
    if width > MAX_DIM || height > MAX_DIM {
        return Err(PhotoStripError::render(format!(
            "image size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok(())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
