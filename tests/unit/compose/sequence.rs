use super::*;
use crate::foundation::core::Canvas;
use crate::script::model::ActionKind;
use crate::script::parser::parse;

fn parts() -> PartSet {
    PartSet::whole_image(Canvas::new(64, 64).unwrap())
}

fn assert_partition(ranges: &[FrameRange], total: u32) {
    let mut next = 0;
    for r in ranges {
        assert_eq!(r.start.0, next);
        next = r.end.0;
    }
    assert_eq!(next, u64::from(total));
}

#[test]
fn allocation_sums_exactly_for_many_shapes() {
    let weight_sets: [&[f64]; 5] = [
        &[1.0],
        &[1.0, 1.0, 1.0],
        &[1.5, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6],
        &[0.8, 1.4, 1.2, 1.1],
        &[0.33, 0.33, 0.34],
    ];
    for weights in weight_sets {
        for total in 0..=60 {
            let ranges = allocate_ranges(weights, total).unwrap();
            assert_eq!(ranges.len(), weights.len());
            assert_partition(&ranges, total);
            if total as usize >= weights.len() {
                assert!(ranges.iter().all(|r| !r.is_empty()), "{weights:?} {total}");
            }
        }
    }
}

#[test]
fn allocation_follows_weights() {
    let ranges = allocate_ranges(&[1.0, 3.0], 40).unwrap();
    assert_eq!(ranges[0].len_frames(), 10);
    assert_eq!(ranges[1].len_frames(), 30);
}

#[test]
fn allocation_rejects_bad_weights() {
    assert!(allocate_ranges(&[], 10).is_err());
    assert!(allocate_ranges(&[0.0, 0.0], 10).is_err());
    assert!(allocate_ranges(&[1.0, f64::NAN], 10).is_err());
}

#[test]
fn compose_yields_exact_frame_count() {
    let plan = parse("duckling walks then jumps then flies");
    for total in [1, 2, 3, 7, 15, 40] {
        let seq = compose(&plan, &parts(), Some(total), None, &SynthOpts::default()).unwrap();
        assert_eq!(seq.len(), total as usize);
        for (i, f) in seq.frames().iter().enumerate() {
            assert_eq!(f.index, FrameIndex(i as u64));
            assert!((0.0..1.0).contains(&f.phase));
            assert_eq!(f.duration_ms, plan.suggested_frame_duration_ms());
        }
        let ranges: Vec<FrameRange> = seq.spans().iter().map(|s| s.range).collect();
        assert_partition(&ranges, total);
    }
}

#[test]
fn compose_defaults_to_suggestions_and_rejects_zero() {
    let plan = parse("walks");
    let seq = compose(&plan, &parts(), None, Some(50), &SynthOpts::default()).unwrap();
    assert_eq!(seq.len(), plan.suggested_frame_count() as usize);
    assert!(seq.frames().iter().all(|f| f.duration_ms == 50));

    assert!(compose(&plan, &parts(), Some(0), None, &SynthOpts::default()).is_err());
    assert!(compose(&plan, &parts(), None, Some(0), &SynthOpts::default()).is_err());
}

#[test]
fn compose_caps_the_frame_count() {
    let plan = parse("walks");
    let synth = SynthOpts::default();
    let err = compose(&plan, &parts(), Some(u32::MAX), None, &synth).unwrap_err();
    assert!(matches!(err, ToonError::Validation(_)));
    assert!(compose(&plan, &parts(), Some(MAX_FRAME_COUNT + 1), None, &synth).is_err());

    let seq = compose(&plan, &parts(), Some(MAX_FRAME_COUNT), Some(10), &synth).unwrap();
    assert_eq!(seq.len(), MAX_FRAME_COUNT as usize);
}

#[test]
fn objects_only_appear_inside_their_owning_range() {
    let plan = parse("duck walks then rolls dice then blinks");
    let seq = compose(&plan, &parts(), Some(30), None, &SynthOpts::default()).unwrap();
    let roll = seq
        .spans()
        .iter()
        .find(|s| plan.actions()[s.action_index].kind == ActionKind::Roll)
        .unwrap();
    for f in seq.frames() {
        let has_dice = f.objects.iter().any(|o| o.kind == ObjectKind::Dice);
        assert_eq!(has_dice, roll.range.contains(f.index), "frame {:?}", f.index);
    }
}

#[test]
fn numeric_result_without_dice_becomes_a_late_badge() {
    let plan = parse("duck jumps and result is 4");
    let seq = compose(&plan, &parts(), Some(20), None, &SynthOpts::default()).unwrap();
    for f in seq.frames() {
        let badge = f.objects.iter().find(|o| o.kind == ObjectKind::Badge);
        if f.phase >= BADGE_PHASE {
            assert_eq!(badge.map(|b| b.glyph), Some(Some(4)));
        } else {
            assert!(badge.is_none());
        }
    }
}

#[test]
fn numeric_result_with_dice_shows_on_the_die() {
    let plan = parse("duck rolls dice as result is 5");
    let seq = compose(&plan, &parts(), Some(30), None, &SynthOpts::default()).unwrap();
    let last = seq.frames().last().unwrap();
    let die = last.objects.iter().find(|o| o.kind == ObjectKind::Dice).unwrap();
    assert_eq!(die.glyph, Some(5));
    assert_eq!(die.pips, 5);
    assert!(seq
        .frames()
        .iter()
        .all(|f| f.objects.iter().all(|o| o.kind != ObjectKind::Badge)));
}

#[test]
fn outcome_flags_render_late_in_the_action() {
    let win = parse("duck jumps and wins");
    let seq = compose(&win, &parts(), Some(20), None, &SynthOpts::default()).unwrap();
    let first = &seq.frames()[0];
    let last = seq.frames().last().unwrap();
    assert!(first.objects.is_empty());
    assert!(last.objects.iter().any(|o| o.kind == ObjectKind::Star));

    let lose = parse("duck walks and fails");
    let seq = compose(&lose, &parts(), Some(20), None, &SynthOpts::default()).unwrap();
    assert_eq!(seq.frames().last().unwrap().pose.eye_state, EyeState::Closed);
}

#[test]
fn frame_lookup_is_bounded() {
    let plan = parse("walks");
    let seq = compose(&plan, &parts(), Some(5), None, &SynthOpts::default()).unwrap();
    assert!(seq.frame(FrameIndex(4)).is_some());
    assert!(seq.frame(FrameIndex(5)).is_none());
}
