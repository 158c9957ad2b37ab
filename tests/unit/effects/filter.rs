use std::io::Cursor;

use super::*;

fn encoded(w: u32, h: u32, px: [u8; 4], format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    let dynamic = if format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(img).to_rgb8())
    } else {
        image::DynamicImage::ImageRgba8(img)
    };
    dynamic.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn decoded(bytes: &[u8]) -> image::RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

#[test]
fn luma_of_pure_red_is_76() {
    assert_eq!(luma(255, 0, 0), 76);
    assert_eq!(luma(0, 255, 0), 150);
    assert_eq!(luma(0, 0, 255), 29);
    assert_eq!(luma(255, 255, 255), 255);
}

#[test]
fn monochrome_png_red_becomes_gray_76() {
    let red = encoded(4, 4, [255, 0, 0, 255], image::ImageFormat::Png);
    let out = apply_filter(&red, FilterKind::Monochrome);
    assert_eq!(OutputFormat::sniff(&out), OutputFormat::Png);
    for px in decoded(&out).pixels() {
        assert_eq!(px.0, [76, 76, 76, 255]);
    }
}

#[test]
fn monochrome_jpeg_keeps_channels_equal() {
    let photo = encoded(16, 16, [200, 90, 40, 255], image::ImageFormat::Jpeg);
    let out = apply_filter(&photo, FilterKind::Monochrome);
    assert_eq!(OutputFormat::sniff(&out), OutputFormat::Jpeg);
    for px in decoded(&out).pixels() {
        assert_eq!(px.0[0], px.0[1]);
        assert_eq!(px.0[1], px.0[2]);
    }
}

#[test]
fn none_is_identity_on_bytes() {
    let photo = encoded(3, 3, [1, 2, 3, 255], image::ImageFormat::Png);
    assert_eq!(apply_filter(&photo, FilterKind::None), photo);
}

#[test]
fn undecodable_input_is_returned_unchanged() {
    let junk = b"not a photo at all".to_vec();
    for kind in FilterKind::ALL {
        assert_eq!(apply_filter(&junk, kind), junk, "{kind}");
    }
}

#[test]
fn warm_and_cool_tint_toward_their_colors() {
    let gray = encoded(2, 2, [128, 128, 128, 255], image::ImageFormat::Png);

    let warm = decoded(&apply_filter(&gray, FilterKind::Warm));
    let w = warm.get_pixel(0, 0).0;
    assert!(w[0] > w[1] && w[1] > w[2], "{w:?}");
    assert_eq!(w[3], 255);

    let cool = decoded(&apply_filter(&gray, FilterKind::Cool));
    let c = cool.get_pixel(1, 1).0;
    assert!(c[2] > c[1] && c[1] > c[0], "{c:?}");
}

#[test]
fn warm_tint_matches_twenty_percent_blend() {
    let black = encoded(1, 1, [0, 0, 0, 255], image::ImageFormat::Png);
    let out = decoded(&apply_filter(&black, FilterKind::Warm));
    assert_eq!(out.get_pixel(0, 0).0, [51, 40, 30, 255]);
}

#[test]
fn grain_is_bounded_and_seeded() {
    let mid = encoded(32, 32, [128, 128, 128, 255], image::ImageFormat::Png);
    let a = apply_filter_seeded(&mid, FilterKind::Grain, 7);
    let b = apply_filter_seeded(&mid, FilterKind::Grain, 7);
    let c = apply_filter_seeded(&mid, FilterKind::Grain, 8);
    assert_eq!(a, b);
    assert_ne!(a, c);

    let img = decoded(&a);
    let mut differs = 0;
    for px in img.pixels() {
        for ch in &px.0[..3] {
            assert!((i16::from(*ch) - 128).abs() <= 10);
            if *ch != 128 {
                differs += 1;
            }
        }
        assert_eq!(px.0[3], 255);
    }
    assert!(differs > 32 * 32);
}

#[test]
fn grain_clamps_at_extremes() {
    let mut px = vec![0u8, 255, 3, 255];
    let mut rng = Rng64::new(1);
    for _ in 0..64 {
        grain_in_place(&mut px, &mut rng, 10);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn parse_and_display() {
    assert_eq!("bw".parse::<FilterKind>().unwrap(), FilterKind::Monochrome);
    assert_eq!("Film".parse::<FilterKind>().unwrap(), FilterKind::Grain);
    assert!("sepia".parse::<FilterKind>().is_err());
    for kind in FilterKind::ALL {
        assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
    }
    assert!(!FilterKind::Grain.is_deterministic());
    assert!(FilterKind::Warm.is_deterministic());
}
