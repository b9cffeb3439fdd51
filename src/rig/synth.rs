//! Pose Synthesizer.
//!
//! Each [`ActionKind`] maps to a closed-form motion function of phase through [`handler`]. The
//! motion is expressed in reference pixels (a 256 px short side), exaggerated by the emotion and
//! global amplitude, then scaled to the canvas and spread over whichever parts are present.

use crate::animation::ease::{ease_between, smoothstep, window};
use crate::animation::noise::jitter;
use crate::foundation::core::{FrameIndex, Vec2};
use crate::foundation::error::{ToonError, ToonResult};
use crate::rig::parts::{PartId, PartSet};
use crate::rig::pose::{EyeState, PartTransform, Pose};
use crate::script::model::{Action, ActionKind, Emotion};
use std::f64::consts::{PI, TAU};

const REFERENCE_SIDE_PX: f64 = 256.0;
/// Phase step used for the velocity finite difference.
const VELOCITY_STEP: f64 = 1.0 / 40.0;
/// Reference pixels per step that count as full speed.
const FULL_SPEED_PX: f64 = 8.0;
/// Lever arm converting body rotation into travelled pixels.
const ROTATION_ARM_PX: f64 = 48.0;
const MIN_SQUASH: f64 = 0.25;

/// Knobs for [`synthesize`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthOpts {
    /// Seed for the per-frame hand-drawn wobble.
    pub jitter_seed: u64,
    /// Radius of the wobble in output pixels. Zero disables it.
    pub jitter_radius_px: f64,
    /// Normalized speed above which motion smear kicks in.
    pub blur_cutoff: f64,
    /// Global exaggeration multiplier.
    pub amplitude: f64,
}

impl Default for SynthOpts {
    fn default() -> Self {
        Self {
            jitter_seed: 0,
            jitter_radius_px: 1.5,
            blur_cutoff: 0.7,
            amplitude: 1.0,
        }
    }
}

impl SynthOpts {
    /// Reject negative or non-finite knobs.
    pub fn validate(&self) -> ToonResult<()> {
        for (name, v) in [
            ("jitter_radius_px", self.jitter_radius_px),
            ("blur_cutoff", self.blur_cutoff),
            ("amplitude", self.amplitude),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ToonError::validation(format!(
                    "synth {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Rig-level motion for one phase sample, in reference pixels and degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    /// Upward body offset.
    rise: f64,
    sway: f64,
    body_rot: f64,
    /// Vertical squash factor; horizontal is the reciprocal.
    squash: f64,
    head_rot: f64,
    head_dx: f64,
    head_dy: f64,
    /// Right wing angle; the left wing mirrors it.
    wing: f64,
    leg_l: f64,
    leg_r: f64,
    eye_dx: f64,
    eyes: EyeState,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            rise: 0.0,
            sway: 0.0,
            body_rot: 0.0,
            squash: 1.0,
            head_rot: 0.0,
            head_dx: 0.0,
            head_dy: 0.0,
            wing: 0.0,
            leg_l: 0.0,
            leg_r: 0.0,
            eye_dx: 0.0,
            eyes: EyeState::Open,
        }
    }
}

impl Motion {
    fn exaggerate(mut self, amp: f64) -> Self {
        self.rise *= amp;
        self.sway *= amp;
        self.body_rot *= amp;
        self.squash = (1.0 + (self.squash - 1.0) * amp).max(MIN_SQUASH);
        self.head_rot *= amp;
        self.head_dx *= amp;
        self.head_dy *= amp;
        self.wing *= amp;
        self.leg_l *= amp;
        self.leg_r *= amp;
        self.eye_dx *= amp;
        self
    }
}

type Handler = fn(f64) -> Motion;

/// Pose rule per action kind.
fn handler(kind: ActionKind) -> Handler {
    match kind {
        ActionKind::Walk => walk,
        ActionKind::Jump => jump,
        ActionKind::Fly => fly,
        ActionKind::Idle => idle,
        ActionKind::Roll => roll,
        ActionKind::Cheer => cheer,
        ActionKind::Blink => blink,
    }
}

fn walk(p: f64) -> Motion {
    let step = 2.0 * TAU * p;
    let lag = step - 0.3;
    let blinking = (p * 3.0).fract() < 0.06;
    Motion {
        rise: 6.0 * (1.0 - (2.0 * step).cos()),
        body_rot: 4.0 * step.sin(),
        squash: 1.0 / (1.0 + 0.15 * step.cos()),
        head_rot: 8.0 * lag.sin(),
        head_dy: 3.0 * lag.sin(),
        wing: 8.0 * step.sin(),
        leg_l: 35.0 * step.sin(),
        leg_r: -35.0 * step.sin(),
        eye_dx: 2.0 * step.sin(),
        eyes: if blinking {
            EyeState::Closed
        } else {
            EyeState::Open
        },
        ..Motion::default()
    }
}

const JUMP_SQUAT_PX: f64 = 15.0;
const JUMP_HEIGHT_PX: f64 = 64.0;
const JUMP_OVERSHOOT_PX: f64 = 10.0;

fn jump(p: f64) -> Motion {
    // Wings beat only while airborne.
    let flap = (PI * window(p, 0.2, 0.6)).sin();
    let wing = 45.0 * flap * (3.0 * TAU * p).sin();
    let mut m = Motion {
        wing,
        ..Motion::default()
    };
    if p < 0.2 {
        // anticipation
        m.rise = ease_between(p, 0.0, 0.2, 0.0, -JUMP_SQUAT_PX);
        m.squash = ease_between(p, 0.0, 0.2, 1.0, 0.85);
        m.head_dy = ease_between(p, 0.0, 0.2, 0.0, 3.0);
    } else if p < 0.6 {
        let s = smoothstep(window(p, 0.2, 0.6));
        let arc = (PI * s).sin();
        m.rise = -JUMP_SQUAT_PX * (1.0 - s) + JUMP_HEIGHT_PX * arc;
        m.squash = 0.85 + 0.15 * s + 0.2 * arc;
        m.head_dy = 3.0 * (1.0 - s);
        m.leg_l = 45.0 * arc;
        m.leg_r = 45.0 * arc;
        m.eyes = EyeState::Wide;
    } else if p < 0.8 {
        m.rise = ease_between(p, 0.6, 0.8, 0.0, -JUMP_OVERSHOOT_PX);
        m.squash = ease_between(p, 0.6, 0.8, 1.0, 0.8);
        m.head_dy = ease_between(p, 0.6, 0.8, 0.0, 4.0);
    } else {
        m.rise = ease_between(p, 0.8, 1.0, -JUMP_OVERSHOOT_PX, 0.0);
        m.squash = ease_between(p, 0.8, 1.0, 0.8, 1.0);
        m.head_dy = ease_between(p, 0.8, 1.0, 4.0, 0.0);
    }
    m
}

fn fly(p: f64) -> Motion {
    let hover = (TAU * p).sin();
    Motion {
        rise: 10.0 * hover,
        body_rot: 5.0,
        head_rot: -2.0 * hover,
        wing: 55.0 * (4.0 * TAU * p).sin(),
        leg_l: 45.0,
        leg_r: 45.0,
        ..Motion::default()
    }
}

fn idle(p: f64) -> Motion {
    let breath = (TAU * p).sin();
    let turn = (PI * window(p, 0.3, 0.7)).sin();
    let blinking = (0.40..0.45).contains(&p) || (0.80..0.85).contains(&p);
    Motion {
        rise: 2.0 * breath,
        squash: 1.0 + 0.03 * breath,
        head_rot: 10.0 * turn,
        head_dx: 8.0 * turn,
        eye_dx: 2.0 * turn,
        eyes: if blinking {
            EyeState::Closed
        } else {
            EyeState::Open
        },
        ..Motion::default()
    }
}

fn roll(p: f64) -> Motion {
    let beat = (2.0 * TAU * p).sin();
    Motion {
        rise: 16.0 * beat.abs(),
        sway: 6.0 * (TAU * p).sin(),
        body_rot: 15.0 * beat,
        squash: 0.9 + 0.2 * beat.abs(),
        head_rot: -6.0 * beat,
        wing: 40.0 * (4.0 * TAU * p).sin(),
        leg_l: 25.0 * beat,
        leg_r: 25.0 * beat,
        eyes: EyeState::Sparkle,
        ..Motion::default()
    }
}

fn cheer(p: f64) -> Motion {
    let beat = (3.0 * TAU * p).sin();
    Motion {
        rise: 20.0 * beat.abs(),
        body_rot: 10.0 * beat,
        squash: 0.9 + 0.2 * beat.abs(),
        head_rot: 6.0 * beat,
        wing: 50.0 * (4.0 * TAU * p).sin(),
        leg_l: 20.0 * beat,
        leg_r: -20.0 * beat,
        eyes: EyeState::Sparkle,
        ..Motion::default()
    }
}

fn blink(p: f64) -> Motion {
    Motion {
        eyes: if (0.35..0.65).contains(&p) {
            EyeState::Closed
        } else {
            EyeState::Open
        },
        ..Motion::default()
    }
}

/// Pose for `action` at `phase`.
///
/// Pure: the same arguments always give the same pose. Parts missing from `parts` get no
/// transform.
pub fn synthesize(
    action: &Action,
    phase: f64,
    frame: FrameIndex,
    parts: &PartSet,
    opts: &SynthOpts,
) -> Pose {
    let p = if phase.is_finite() {
        phase.clamp(0.0, 1.0 - f64::EPSILON)
    } else {
        0.0
    };
    let amp = opts.amplitude * action.amplitude();
    let rule = handler(action.kind);
    let motion = rule(p).exaggerate(amp);

    let (a, b) = if p + VELOCITY_STEP < 1.0 {
        (motion, rule(p + VELOCITY_STEP).exaggerate(amp))
    } else {
        (rule(p - VELOCITY_STEP).exaggerate(amp), motion)
    };
    let travel = Vec2::new(
        b.sway - a.sway + (b.body_rot - a.body_rot).to_radians() * ROTATION_ARM_PX,
        a.rise - b.rise,
    );
    let speed = travel.hypot() / FULL_SPEED_PX;

    let unit = parts.canvas().short_side() / REFERENCE_SIDE_PX;
    let mut pose = Pose::neutral();
    pose.eye_state = match (motion.eyes, action.emotion) {
        (EyeState::Open, Some(Emotion::Surprised)) => EyeState::Wide,
        (eyes, _) => eyes,
    };
    if speed > opts.blur_cutoff {
        let span = (1.0 - opts.blur_cutoff).max(1e-6);
        pose.blur_strength = ((speed - opts.blur_cutoff) / span).clamp(0.0, 1.0);
        pose.blur_axis = travel.normalize();
    }
    pose.jitter = jitter(opts.jitter_seed, frame.0, opts.jitter_radius_px);

    let mut place = |part: PartId, t: PartTransform| {
        if parts.is_present(part) {
            pose.set(part, t);
        }
    };
    place(
        PartId::Body,
        PartTransform {
            translate: Vec2::new(motion.sway, -motion.rise) * unit,
            rotation_deg: motion.body_rot,
            ..PartTransform::IDENTITY
        }
        .with_squash(motion.squash),
    );
    place(
        PartId::Head,
        PartTransform {
            translate: Vec2::new(motion.head_dx, motion.head_dy) * unit,
            rotation_deg: motion.head_rot,
            ..PartTransform::IDENTITY
        },
    );
    for wing in [PartId::WingL, PartId::WingR] {
        place(wing, PartTransform::rotation(motion.wing * wing.side()));
    }
    place(PartId::LegL, PartTransform::rotation(motion.leg_l));
    place(PartId::LegR, PartTransform::rotation(motion.leg_r));
    for eye in [PartId::EyeL, PartId::EyeR] {
        place(eye, PartTransform::offset(motion.eye_dx * unit, 0.0));
    }
    pose
}

#[cfg(test)]
#[path = "../../tests/unit/rig/synth.rs"]
mod tests;
