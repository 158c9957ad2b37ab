use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{PhotoStripError, PhotoStripResult};

/// Container format for encoded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG (opaque).
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type for sharing collaborators.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Best matching output format for already encoded `bytes`; anything but PNG maps to JPEG.
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Self::Png,
            _ => Self::Jpeg,
        }
    }
}

/// Encode a straight-alpha RGBA8 image. JPEG drops alpha.
pub fn encode_rgba(
    img: &image::RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> PhotoStripResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            jpeg_encoder(&mut buf, jpeg_quality)?
                .encode_image(&rgb)
                .context("encode jpeg")?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .context("encode png")?;
        }
    }
    Ok(buf)
}

/// Encode a single-channel gray image, keeping R = G = B exact after decode.
pub fn encode_luma(
    img: &image::GrayImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> PhotoStripResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            jpeg_encoder(&mut buf, jpeg_quality)?
                .encode_image(img)
                .context("encode jpeg")?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .context("encode png")?;
        }
    }
    Ok(buf)
}

fn jpeg_encoder(
    buf: &mut Vec<u8>,
    quality: u8,
) -> PhotoStripResult<image::codecs::jpeg::JpegEncoder<&mut Vec<u8>>> {
    if !(1..=100).contains(&quality) {
        return Err(PhotoStripError::validation(format!(
            "jpeg quality must be in 1..=100, got {quality}"
        )));
    }
    Ok(image::codecs::jpeg::JpegEncoder::new_with_quality(
        buf, quality,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
