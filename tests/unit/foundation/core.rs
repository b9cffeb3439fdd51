use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    assert!(
        FrameRange::new(FrameIndex(3), FrameIndex(3))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn phase_is_local_and_half_open() {
    let r = FrameRange::new(FrameIndex(10), FrameIndex(14)).unwrap();
    assert_eq!(r.phase_of(FrameIndex(10)), Some(0.0));
    assert_eq!(r.phase_of(FrameIndex(12)), Some(0.5));
    assert_eq!(r.phase_of(FrameIndex(13)), Some(0.75));
    assert_eq!(r.phase_of(FrameIndex(14)), None);
    assert_eq!(r.phase_of(FrameIndex(9)), None);
}

#[test]
fn canvas_rejects_empty_and_sizes_buffers() {
    assert!(Canvas::new(0, 4).is_err());
    let c = Canvas::new(3, 2).unwrap();
    assert_eq!(c.rgba_len().unwrap(), 24);
    assert_eq!(c.short_side(), 2.0);
}
