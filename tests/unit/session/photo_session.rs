use std::io::Cursor;

use super::*;
use crate::delivery::sink::InMemorySink;

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn lazy_session() -> PhotoSession {
    PhotoSession::new(SessionConfig {
        auto_composite: false,
        ..SessionConfig::default()
    })
    .unwrap()
}

fn capturing(layout: LayoutType) -> PhotoSession {
    let mut s = lazy_session();
    s.choose_layout(layout);
    s.choose_frame(None).unwrap();
    s
}

#[test]
fn guards_reject_work_before_a_layout() {
    let mut s = lazy_session();
    for err in [
        s.choose_frame(None).unwrap_err(),
        s.capture_photo(png([0, 0, 0, 255])).unwrap_err(),
        s.retake(0).unwrap_err(),
        s.toggle_selection(PhotoId(0)).unwrap_err(),
        s.enter_review().unwrap_err(),
        s.set_orientation(Orientation::Landscape).unwrap_err(),
    ] {
        assert!(matches!(err, PhotoStripError::Precondition(_)), "{err}");
    }
    assert_eq!(s.step(), Step::Layout);
    assert_eq!(s.required_count(), 0);
    assert!(!s.is_capture_complete());
}

#[test]
fn layout_then_frame_advances_steps() {
    let mut s = lazy_session();
    s.choose_layout(LayoutType::Grid2x2);
    assert_eq!(s.step(), Step::Frame);
    assert_eq!(s.orientation(), Orientation::Landscape);
    assert_eq!(s.required_count(), 4);

    s.choose_frame(Some(FrameId::Valentines)).unwrap();
    assert_eq!(s.step(), Step::Capture);
    assert_eq!(s.frame(), Some(FrameId::Valentines));
}

#[test]
fn unknown_layout_id_has_no_side_effect() {
    let mut s = capturing(LayoutType::ThreeStrip);
    s.capture_photo(png([1, 1, 1, 255])).unwrap();
    let err = s.choose_layout_by_id("9-strip").unwrap_err();
    assert!(matches!(err, PhotoStripError::UnknownLayout(_)));
    assert_eq!(s.layout().map(|l| l.id), Some(LayoutType::ThreeStrip));
    assert_eq!(s.captured_photos().len(), 1);
    assert_eq!(s.step(), Step::Capture);

    let err = s.choose_frame_by_id(Some("glitter")).unwrap_err();
    assert!(matches!(err, PhotoStripError::UnknownFrame(_)));
    assert_eq!(s.frame(), None);
}

#[test]
fn capture_needs_capture_step_and_respects_limit() {
    let mut s = PhotoSession::new(SessionConfig {
        max_captures: 2,
        auto_composite: false,
        ..SessionConfig::default()
    })
    .unwrap();
    s.choose_layout(LayoutType::ThreeStrip);
    assert!(s.capture_photo(png([0, 0, 0, 255])).is_err());
    s.choose_frame(None).unwrap();

    let a = s.capture_photo(png([0, 0, 0, 255])).unwrap();
    let b = s.capture_photo(png([0, 0, 0, 255])).unwrap();
    assert!(a < b);
    assert!(matches!(
        s.capture_photo(png([0, 0, 0, 255])),
        Err(PhotoStripError::Precondition(_))
    ));

    // Retakes replace and are always allowed.
    s.retake(0).unwrap();
    assert_eq!(s.capture_photo(png([9, 9, 9, 255])).unwrap(), a);
    assert_eq!(s.remaining_captures(), 1);
}

#[test]
fn retake_replaces_only_that_slot() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..3)
        .map(|i| s.capture_photo(png([i * 10, 0, 0, 255])).unwrap())
        .collect();
    let before: Vec<_> = s.captured_photos().iter().map(|p| p.image.clone()).collect();

    s.enter_review().unwrap();
    s.retake(1).unwrap();
    assert_eq!(s.step(), Step::Capture);
    assert_eq!(s.retake_index(), Some(1));

    let replacement = png([0, 200, 0, 255]);
    assert_eq!(s.capture_photo(replacement.clone()).unwrap(), ids[1]);
    assert_eq!(s.retake_index(), None);

    let after = s.captured_photos();
    assert_eq!(after.len(), 3);
    assert_eq!(after[0].image, before[0]);
    assert_eq!(after[1].image.as_slice(), replacement.as_slice());
    assert_eq!(after[1].revision, 1);
    assert_eq!(after[2].image, before[2]);
    assert_eq!(s.captured_photos().iter().map(|p| p.id).collect::<Vec<_>>(), ids);
}

#[test]
fn retake_out_of_range_is_rejected() {
    let mut s = capturing(LayoutType::ThreeStrip);
    s.capture_photo(png([0, 0, 0, 255])).unwrap();
    assert!(matches!(s.retake(1), Err(PhotoStripError::Precondition(_))));
    assert_eq!(s.retake_index(), None);
}

#[test]
fn selection_is_fifo_bounded_by_photo_count() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..5)
        .map(|_| s.capture_photo(png([5, 5, 5, 255])).unwrap())
        .collect();

    for id in &ids[..3] {
        assert!(s.toggle_selection(*id).unwrap());
    }
    assert_eq!(s.selection(), &ids[..3]);

    assert!(s.toggle_selection(ids[3]).unwrap());
    assert_eq!(s.selection(), &[ids[1], ids[2], ids[3]]);

    assert!(!s.toggle_selection(ids[2]).unwrap());
    assert_eq!(s.selection(), &[ids[1], ids[3]]);

    assert!(s.toggle_selection(ids[4]).unwrap());
    assert!(s.toggle_selection(ids[0]).unwrap());
    assert_eq!(s.selection(), &[ids[3], ids[4], ids[0]]);
    assert!(s.selection().len() <= 3);

    assert!(matches!(
        s.toggle_selection(PhotoId(999)),
        Err(PhotoStripError::Precondition(_))
    ));
}

#[test]
fn choosing_layout_discards_in_progress_captures() {
    let mut s = capturing(LayoutType::FourStrip);
    let id = s.capture_photo(png([1, 2, 3, 255])).unwrap();
    s.toggle_selection(id).unwrap();

    s.choose_layout(LayoutType::ThreeStrip);
    assert!(s.captured_photos().is_empty());
    assert!(s.selection().is_empty());
    assert_eq!(s.step(), Step::Frame);
    assert_eq!(s.remaining_captures(), 3);
}

#[test]
fn enter_review_requires_enough_photos_and_preselects() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..4)
        .map(|_| s.capture_photo(png([5, 5, 5, 255])).unwrap())
        .collect();
    assert!(s.is_capture_complete());

    let mut short = capturing(LayoutType::ThreeStrip);
    short.capture_photo(png([5, 5, 5, 255])).unwrap();
    assert!(matches!(short.enter_review(), Err(PhotoStripError::Precondition(_))));

    s.enter_review().unwrap();
    assert_eq!(s.step(), Step::Review);
    assert_eq!(s.selection(), &ids[..3]);

    assert!(s.capture_photo(png([5, 5, 5, 255])).is_err());
    s.resume_capture().unwrap();
    assert_eq!(s.step(), Step::Capture);
}

#[test]
fn remove_photo_cleans_selection_and_retake() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..3)
        .map(|_| s.capture_photo(png([5, 5, 5, 255])).unwrap())
        .collect();
    s.toggle_selection(ids[1]).unwrap();
    s.retake(2).unwrap();

    s.remove_photo(ids[1]).unwrap();
    assert!(s.selection().is_empty());
    assert_eq!(s.retake_index(), Some(1));

    s.remove_photo(ids[2]).unwrap();
    assert_eq!(s.retake_index(), None);
    assert!(s.remove_photo(ids[2]).is_err());
}

#[test]
fn preferences_do_not_touch_photos() {
    let mut s = capturing(LayoutType::ThreeStrip);
    assert_eq!(s.flip_facing_mode(), FacingMode::Environment);
    s.set_facing_mode(FacingMode::User);
    assert_eq!(s.facing_mode(), FacingMode::User);

    let raw = png([255, 0, 0, 255]);
    let plain = s.capture_photo(raw.clone()).unwrap();
    s.set_filter(FilterKind::Monochrome);
    assert_eq!(s.filter(), FilterKind::Monochrome);
    let mono = s.capture_photo(raw.clone()).unwrap();

    let plain = s.state().photo(plain).unwrap();
    assert_eq!(plain.image.as_slice(), raw.as_slice());
    let mono = image::load_from_memory(&s.state().photo(mono).unwrap().image)
        .unwrap()
        .to_rgba8();
    assert_eq!(mono.get_pixel(0, 0).0, [76, 76, 76, 255]);
}

#[test]
fn composite_key_requires_full_selection() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..3)
        .map(|_| s.capture_photo(png([5, 5, 5, 255])).unwrap())
        .collect();
    assert!(s.composite_key().is_none());
    assert!(s.composite_job().is_none());
    for id in &ids {
        s.toggle_selection(*id).unwrap();
    }
    let key = s.composite_key().unwrap();
    assert_eq!(key.photos, ids.iter().map(|id| (*id, 0)).collect::<Vec<_>>());
    assert_eq!(key.layout, LayoutType::ThreeStrip);
    // Lazy sessions never render inline.
    assert!(s.composite().is_none());
}

#[test]
fn stale_job_results_are_discarded() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let ids: Vec<_> = (0..3)
        .map(|_| s.capture_photo(png([5, 5, 5, 255])).unwrap())
        .collect();
    s.enter_review().unwrap();

    let job = s.composite_job().unwrap();
    let output = job.run().unwrap();

    s.toggle_selection(ids[0]).unwrap();
    assert!(!s.accept_composite(job.key().clone(), output.clone()));
    assert!(s.composite().is_none());

    s.toggle_selection(ids[0]).unwrap();
    let job2 = s.composite_job().unwrap();
    assert_ne!(job2.key(), job.key());
    let out2 = job2.run().unwrap();
    assert!(s.accept_composite(job2.key().clone(), out2.clone()));
    assert_eq!(s.composite(), Some(&out2));

    // Any relevant mutation clears it again.
    s.set_orientation(Orientation::Landscape).unwrap();
    assert!(s.composite().is_none());
}

#[test]
fn auto_session_renders_and_delivers() {
    let mut s = PhotoSession::new(SessionConfig::default()).unwrap();
    s.choose_layout(LayoutType::ThreeStrip);
    s.choose_frame(None).unwrap();
    for _ in 0..3 {
        s.capture_photo(png([40, 80, 120, 255])).unwrap();
    }
    let mut sink = InMemorySink::new();
    assert!(matches!(
        s.deliver(&mut sink, &DeliveryMeta::at(1)),
        Err(PhotoStripError::Precondition(_))
    ));

    s.enter_review().unwrap();
    let out = s.composite().unwrap().clone();
    assert_eq!((out.width, out.height), (600, 1800));

    s.deliver(&mut sink, &DeliveryMeta::at(1)).unwrap();
    assert_eq!(sink.deliveries()[0].0, out);

    s.reset();
    assert!(s.composite().is_none());
    assert_eq!(s.step(), Step::Layout);
    assert!(s.captured_photos().is_empty());
}

#[test]
fn ids_are_not_reused_after_reset() {
    let mut s = capturing(LayoutType::ThreeStrip);
    let first = s.capture_photo(png([0, 0, 0, 255])).unwrap();
    s.reset();
    s.choose_layout(LayoutType::ThreeStrip);
    s.choose_frame(None).unwrap();
    let second = s.capture_photo(png([0, 0, 0, 255])).unwrap();
    assert!(second > first);
}

#[test]
fn frame_swap_in_review_rerenders_the_composite() {
    let mut s = PhotoSession::new(SessionConfig::default()).unwrap();
    s.choose_layout(LayoutType::ThreeStrip);
    s.choose_frame(None).unwrap();
    for _ in 0..3 {
        s.capture_photo(png([60, 60, 60, 255])).unwrap();
    }
    s.enter_review().unwrap();
    let plain = s.composite().unwrap().clone();

    s.choose_frame(Some(FrameId::ClassicWhite)).unwrap();
    assert_eq!(s.step(), Step::Review);
    assert_eq!(s.frame(), Some(FrameId::ClassicWhite));
    let framed = s.composite().unwrap().clone();
    assert_ne!(framed.bytes, plain.bytes);
    assert_eq!((framed.width, framed.height), (plain.width, plain.height));

    s.choose_frame(None).unwrap();
    assert_eq!(s.composite().unwrap().bytes, plain.bytes);
}

#[test]
fn frame_swap_in_review_clears_lazy_composite() {
    let mut s = capturing(LayoutType::ThreeStrip);
    for _ in 0..3 {
        s.capture_photo(png([60, 60, 60, 255])).unwrap();
    }
    s.enter_review().unwrap();
    let job = s.composite_job().unwrap();
    let output = job.run().unwrap();
    assert!(s.accept_composite(job.key().clone(), output.clone()));

    s.choose_frame(Some(FrameId::Valentines)).unwrap();
    assert_eq!(s.step(), Step::Review);
    assert!(s.composite().is_none());
    assert!(!s.accept_composite(job.key().clone(), output));
    assert_eq!(
        s.composite_key().unwrap().frame,
        Some(FrameId::Valentines)
    );
}
