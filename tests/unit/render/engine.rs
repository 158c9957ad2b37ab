use std::io::Cursor;

use super::*;
use crate::assets::source::MemoryAssetSource;

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn png_engine() -> CompositeEngine {
    CompositeEngine::new(EngineConfig {
        output_format: OutputFormat::Png,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn decode(out: &CompositeOutput) -> image::RgbaImage {
    image::load_from_memory(&out.bytes).unwrap().to_rgba8()
}

#[test]
fn download_name_uses_format_extension() {
    let out = CompositeOutput {
        bytes: Arc::new(Vec::new()),
        format: OutputFormat::Jpeg,
        width: 1,
        height: 1,
    };
    assert_eq!(out.download_name(1_700_000_000_000), "photostrip-1700000000000.jpg");
    assert_eq!(out.mime_type(), "image/jpeg");
}

#[test]
fn photos_land_in_slot_order() {
    let engine = png_engine();
    let photos = vec![
        png(8, 8, [255, 0, 0, 255]),
        png(8, 8, [0, 255, 0, 255]),
        png(8, 8, [0, 0, 255, 255]),
        png(8, 8, [0, 0, 0, 255]),
    ];
    let out = engine
        .compose(LayoutType::Grid2x2, Orientation::Landscape, &photos, None)
        .unwrap();
    let img = decode(&out);
    let layout = layouts::get(LayoutType::Grid2x2);
    let slots = slot_rects(layout, out.canvas(), engine.config());
    let expected = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [0, 0, 0, 255]];
    for (slot, want) in slots.iter().zip(expected) {
        let c = slot.rect.center();
        assert_eq!(img.get_pixel(c.x as u32, c.y as u32).0, want);
    }
    assert_eq!(img.get_pixel(1, 1).0, [255, 245, 245, 255]);
}

#[test]
fn extra_photos_are_ignored() {
    let engine = png_engine();
    let red = png(4, 4, [255, 0, 0, 255]);
    let three = vec![red.clone(), red.clone(), red.clone()];
    let five = vec![red.clone(), red.clone(), red.clone(), red.clone(), red];
    let a = engine
        .compose(LayoutType::ThreeStrip, Orientation::Portrait, &three, None)
        .unwrap();
    let b = engine
        .compose(LayoutType::ThreeStrip, Orientation::Portrait, &five, None)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_overlay_asset_is_skipped() {
    let engine = CompositeEngine::with_assets(
        EngineConfig {
            output_format: OutputFormat::Png,
            ..EngineConfig::default()
        },
        Arc::new(MemoryAssetSource::new()),
    )
    .unwrap();
    let photos = vec![png(4, 4, [9, 9, 9, 255]); 3];
    let framed = engine
        .compose(
            LayoutType::ThreeStrip,
            Orientation::Portrait,
            &photos,
            Some(FrameId::ClassicWhite),
        )
        .unwrap();
    let plain = engine
        .compose(LayoutType::ThreeStrip, Orientation::Portrait, &photos, None)
        .unwrap();
    assert_eq!(framed, plain);
}

#[test]
fn overlay_bytes_that_fail_to_parse_are_skipped() {
    let assets = MemoryAssetSource::new()
        .with("frames/classic-white.svg", png(2, 2, [10, 20, 30, 255]))
        .unwrap();
    let engine = CompositeEngine::with_assets(
        EngineConfig {
            output_format: OutputFormat::Png,
            ..EngineConfig::default()
        },
        Arc::new(assets),
    )
    .unwrap();
    let photos = vec![png(4, 4, [200, 0, 0, 255]); 4];
    let out = engine
        .compose(
            LayoutType::Grid2x2,
            Orientation::Landscape,
            &photos,
            Some(FrameId::ClassicWhite),
        )
        .unwrap();
    assert_eq!(decode(&out).get_pixel(0, 0).0, [255, 245, 245, 255]);
}

#[test]
fn dedicated_pool_renders_identically() {
    let photos = vec![png(6, 9, [1, 2, 3, 255]); 4];
    let pooled = CompositeEngine::new(EngineConfig {
        threads: Some(2),
        ..EngineConfig::default()
    })
    .unwrap();
    let global = CompositeEngine::new(EngineConfig::default()).unwrap();
    let a = pooled
        .compose(LayoutType::FourStrip, Orientation::Portrait, &photos, None)
        .unwrap();
    let b = global
        .compose(LayoutType::FourStrip, Orientation::Portrait, &photos, None)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let err = CompositeEngine::new(EngineConfig {
        jpeg_quality: 0,
        ..EngineConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhotoStripError::Validation(_)));
}

#[test]
fn unknown_ids_fail_fast() {
    let engine = png_engine();
    let photos: Vec<Vec<u8>> = Vec::new();
    assert!(matches!(
        engine.compose_by_id("5-strip", Orientation::Portrait, &photos, None),
        Err(PhotoStripError::UnknownLayout(_))
    ));
    assert!(matches!(
        engine.compose_by_id("3-strip", Orientation::Portrait, &photos, Some("nope")),
        Err(PhotoStripError::UnknownFrame(_))
    ));
}
