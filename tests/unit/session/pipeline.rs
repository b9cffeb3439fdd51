use super::*;

use crate::foundation::core::FrameIndex;
use crate::script::model::{Action, ActionKind};

fn tiny_base() -> BaseImage {
    let (w, h) = (24u32, 20u32);
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            rgba.extend_from_slice(&[(x * 10) as u8, (y * 12) as u8, 90, 255]);
        }
    }
    BaseImage::from_straight_rgba8(w, h, rgba).unwrap()
}

#[test]
fn opts_reject_zero_overrides() {
    let zero_frames = AnimateOpts {
        frame_count: Some(0),
        ..AnimateOpts::default()
    };
    assert!(zero_frames.validate().is_err());

    let too_many = AnimateOpts {
        frame_count: Some(MAX_FRAME_COUNT + 1),
        ..AnimateOpts::default()
    };
    assert!(too_many.validate().is_err());
    let at_limit = AnimateOpts {
        frame_count: Some(MAX_FRAME_COUNT),
        ..AnimateOpts::default()
    };
    assert!(at_limit.validate().is_ok());

    let zero_duration = AnimateOpts {
        frame_duration_ms: Some(0),
        ..AnimateOpts::default()
    };
    assert!(zero_duration.validate().is_err());

    let mut zero_threads = AnimateOpts::default();
    zero_threads.threading.threads = Some(0);
    assert!(zero_threads.validate().is_err());

    let mut bad_radius = AnimateOpts::default();
    bad_radius.synth.jitter_radius_px = f64::NAN;
    assert!(bad_radius.validate().is_err());

    assert!(AnimateOpts::default().validate().is_ok());
}

#[test]
fn opts_load_partial_json() {
    let json = br#"{ "frame_count": 12, "threading": { "parallel": true } }"#;
    let opts = AnimateOpts::from_reader(&json[..]).unwrap();
    assert_eq!(opts.frame_count, Some(12));
    assert!(opts.threading.parallel);
    assert_eq!(opts.threading.chunk_size, RenderThreading::default().chunk_size);
    assert_eq!(opts.synth, SynthOpts::default());

    assert!(AnimateOpts::from_reader(&br#"{ "frame_count": 0 }"#[..]).is_err());
    assert!(AnimateOpts::from_reader(&b"not json"[..]).is_err());
}

#[test]
fn render_honours_frame_overrides() {
    let base = tiny_base();
    let parts = PartSet::whole_image(base.canvas());
    let plan = ActionPlan::new(vec![Action::new(ActionKind::Jump)]).unwrap();
    let opts = AnimateOpts {
        frame_count: Some(6),
        frame_duration_ms: Some(50),
        loop_count: 2,
        ..AnimateOpts::default()
    };
    let anim = render_animation(&base, &parts, &plan, &opts).unwrap();
    assert_eq!(anim.frames.len(), 6);
    assert_eq!(anim.loop_count, 2);
    assert_eq!((anim.width, anim.height), (24, 20));
    assert!(anim.frames.iter().all(|f| f.duration_ms == 50));
}

#[test]
fn parallel_render_matches_serial() {
    let base = tiny_base();
    let parts = PartSet::whole_image(base.canvas());
    let plan = Parser::builtin().parse("walks then jumps with a star");

    let serial = AnimateOpts {
        frame_count: Some(9),
        ..AnimateOpts::default()
    };
    let parallel = AnimateOpts {
        threading: RenderThreading {
            parallel: true,
            chunk_size: 4,
            threads: Some(3),
        },
        ..serial.clone()
    };
    let a = render_animation(&base, &parts, &plan, &serial).unwrap();
    let b = render_animation(&base, &parts, &plan, &parallel).unwrap();
    assert_eq!(a, b);
}

#[test]
fn animate_text_without_parts_uses_whole_image() {
    let base = tiny_base();
    let opts = AnimateOpts {
        frame_count: Some(3),
        ..AnimateOpts::default()
    };
    let anim = animate_text(&base, None, "", &Parser::builtin(), &opts).unwrap();
    assert_eq!(anim.frames.len(), 3);

    let seq = plan_sequence(
        &PartSet::whole_image(base.canvas()),
        &Parser::builtin().parse(""),
        &opts,
    )
    .unwrap();
    assert_eq!(seq.frame(FrameIndex(2)).map(|f| f.index), Some(FrameIndex(2)));
}
