use super::*;

#[test]
fn defaults_are_the_initial_session() {
    let state = SessionState::default();
    assert_eq!(state.step, Step::Layout);
    assert_eq!(state.layout, None);
    assert_eq!(state.frame, None);
    assert!(state.captured.is_empty());
    assert!(state.selection.is_empty());
    assert_eq!(state.filter, FilterKind::None);
    assert_eq!(state.facing_mode, FacingMode::User);
    assert_eq!(state.retake_index, None);
}

#[test]
fn facing_mode_flips_and_parses() {
    assert_eq!(FacingMode::User.flipped(), FacingMode::Environment);
    assert_eq!(FacingMode::Environment.flipped(), FacingMode::User);
    assert_eq!("environment".parse::<FacingMode>().unwrap(), FacingMode::Environment);
    assert!("sideways".parse::<FacingMode>().is_err());
}

#[test]
fn composite_key_fingerprint_tracks_every_input() {
    let base = CompositeKey {
        layout: LayoutType::ThreeStrip,
        orientation: Orientation::Portrait,
        frame: None,
        photos: vec![(PhotoId(1), 0), (PhotoId(2), 0), (PhotoId(3), 0)],
    };
    let fp = base.fingerprint();
    assert_eq!(fp, base.clone().fingerprint());

    let mut retaken = base.clone();
    retaken.photos[1].1 = 1;
    let mut reordered = base.clone();
    reordered.photos.swap(0, 1);
    let mut framed = base.clone();
    framed.frame = Some(FrameId::Valentines);
    let mut rotated = base.clone();
    rotated.orientation = Orientation::Landscape;

    for other in [retaken, reordered, framed, rotated] {
        assert_ne!(other, base);
        assert_ne!(other.fingerprint(), fp);
    }
}

#[test]
fn photo_ids_display_and_order() {
    assert_eq!(PhotoId(3).to_string(), "photo-3");
    assert!(PhotoId(1) < PhotoId(2));
    assert_eq!(Step::Review.to_string(), "review");
}
