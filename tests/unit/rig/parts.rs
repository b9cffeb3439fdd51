use super::*;

fn canvas() -> Canvas {
    Canvas::new(100, 80).unwrap()
}

#[test]
fn hierarchy_roots_at_body() {
    for p in PartId::ALL {
        let mut cur = p;
        let mut steps = 0;
        while let Some(parent) = cur.parent() {
            assert!(parent.index() < cur.index());
            cur = parent;
            steps += 1;
        }
        assert_eq!(cur, PartId::Body);
        assert!(steps <= 2);
    }
    for (i, p) in PartId::ALL.iter().enumerate() {
        assert_eq!(p.index(), i);
    }
}

#[test]
fn whole_image_fallback_has_only_a_body() {
    let set = PartSet::whole_image(canvas());
    assert!(set.is_whole_image());
    assert_eq!(set.get(PartId::Body).bounds, Rect::new(0.0, 0.0, 100.0, 80.0));
    assert!(set.present(PartId::WingL).is_none());
    assert_eq!(set.regions().len(), PartId::COUNT);
}

#[test]
fn from_regions_clips_and_fills_body() {
    let set = PartSet::from_regions(
        canvas(),
        [PartRegion::new(
            PartId::Head,
            Rect::new(80.0, -10.0, 120.0, 30.0),
            RegionShape::Ellipse,
        )],
    )
    .unwrap();
    assert_eq!(set.get(PartId::Head).bounds, Rect::new(80.0, 0.0, 100.0, 30.0));
    assert!(set.is_present(PartId::Body));
    assert!(!set.is_whole_image());
}

#[test]
fn from_regions_rejects_duplicates_and_nan() {
    let r = PartRegion::new(PartId::Beak, Rect::new(1.0, 1.0, 5.0, 5.0), RegionShape::Rect);
    assert!(PartSet::from_regions(canvas(), [r, r]).is_err());

    let bad = PartRegion::new(
        PartId::Beak,
        Rect::new(f64::NAN, 1.0, 5.0, 5.0),
        RegionShape::Rect,
    );
    assert!(PartSet::from_regions(canvas(), [bad]).is_err());
}

#[test]
fn off_canvas_region_becomes_absent() {
    let r = PartRegion::new(
        PartId::LegL,
        Rect::new(200.0, 200.0, 220.0, 240.0),
        RegionShape::Rect,
    );
    let set = PartSet::from_regions(canvas(), [r]).unwrap();
    assert!(!set.is_present(PartId::LegL));
}

#[test]
fn json_regions_default_to_present_rect() {
    let json = r#"[
        {"part": "body", "bounds": {"x0": 10, "y0": 10, "x1": 90, "y1": 70}},
        {"part": "eye_l", "bounds": {"x0": 30, "y0": 20, "x1": 36, "y1": 26}, "shape": "ellipse"},
        {"part": "wing_r", "bounds": {"x0": 0, "y0": 0, "x1": 1, "y1": 1}, "present": false}
    ]"#;
    let set = PartSet::from_reader(canvas(), json.as_bytes()).unwrap();
    assert_eq!(set.get(PartId::EyeL).shape, RegionShape::Ellipse);
    assert_eq!(set.get(PartId::Body).shape, RegionShape::Rect);
    assert!(!set.is_present(PartId::WingR));
    assert!(PartSet::from_reader(canvas(), "nope".as_bytes()).is_err());
}
