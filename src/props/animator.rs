//! Prop Animator: closed-form motion per prop kind.

use crate::animation::ease::{Ease, lerp, smoothstep, window};
use crate::animation::noise::noise01;
use crate::foundation::core::{Point, Vec2};
use crate::script::model::{Condition, ObjectKind, ObjectSpec};
use std::f64::consts::TAU;

/// Local phase at which a die comes to rest.
pub const DICE_REST_PHASE: f64 = 2.0 / 3.0;

/// Placement of one prop on one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectPose {
    /// Which prop.
    pub kind: ObjectKind,
    /// Center in normalized canvas coordinates (`0..1` on each axis, y down).
    pub position: Point,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Per-axis multiplier of the base prop size.
    pub scale: Vec2,
    /// `0..=1`.
    pub opacity: f64,
    /// Number to print next to (or instead of) the prop.
    pub glyph: Option<u32>,
    /// Die face to show, `1..=6`; zero for non-dice.
    pub pips: u8,
}

impl ObjectPose {
    fn at(kind: ObjectKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            rotation_deg: 0.0,
            scale: Vec2::new(1.0, 1.0),
            opacity: 1.0,
            glyph: None,
            pips: 0,
        }
    }
}

/// Pose of `object` at `local_phase` through its owning action's range.
///
/// `condition` is the owning action's condition; only dice and badges read it.
pub fn animate(object: &ObjectSpec, local_phase: f64, condition: Option<Condition>) -> ObjectPose {
    let p = if local_phase.is_finite() {
        local_phase.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let seed = object.params_seed;
    let result = match condition {
        Some(Condition::NumericResult(n)) => Some(n),
        _ => None,
    };
    match object.kind {
        ObjectKind::Dice => dice(seed, p, result),
        ObjectKind::Star => star(seed, p),
        ObjectKind::Heart => heart(seed, p),
        ObjectKind::Coin => coin(p),
        ObjectKind::Badge => badge(p, result),
    }
}

fn dice(seed: u64, p: f64, result: Option<u32>) -> ObjectPose {
    let r = window(p, 0.0, DICE_REST_PHASE);
    let travel = Ease::OutCubic.apply(r);
    let start_x = 0.42 + 0.12 * noise01(seed, 1);
    let hop = 0.14 * ((1.5 * TAU * r).sin()).abs() * (1.0 - r);

    let mut pose = ObjectPose::at(ObjectKind::Dice, lerp(start_x, 0.78, travel), 0.72 - hop);
    pose.rotation_deg = 720.0 * travel;

    let rolled_face = 1 + (noise01(seed, 100 + (r * 9.0) as u64) * 6.0) as u8;
    match result {
        Some(n) if p >= DICE_REST_PHASE => {
            pose.glyph = Some(n);
            pose.pips = if (1..=6).contains(&n) { n as u8 } else { rolled_face };
        }
        _ => pose.pips = rolled_face,
    }
    pose
}

fn star(seed: u64, p: f64) -> ObjectPose {
    let theta = TAU * (p + noise01(seed, 2));
    let mut pose = ObjectPose::at(
        ObjectKind::Star,
        0.5 + 0.35 * theta.cos(),
        0.45 + 0.35 * theta.sin(),
    );
    let pulse = 1.0 + 0.5 * (2.0 * TAU * p).sin();
    pose.scale = Vec2::new(pulse, pulse);
    pose.rotation_deg = 360.0 * p;
    pose
}

fn heart(seed: u64, p: f64) -> ObjectPose {
    let lane = 0.3 + 0.4 * noise01(seed, 3);
    let mut pose = ObjectPose::at(
        ObjectKind::Heart,
        lane + 0.03 * (1.5 * TAU * p).sin(),
        lerp(0.9, 0.2, p),
    );
    pose.opacity = 1.0 - p;
    pose.rotation_deg = 10.0 * (TAU * p).sin();
    pose
}

fn coin(p: f64) -> ObjectPose {
    let mut pose = ObjectPose::at(ObjectKind::Coin, 0.5, 0.25 + 0.02 * (TAU * p).sin());
    pose.scale = Vec2::new((2.0 * TAU * p).cos().abs().max(0.05), 1.0);
    pose
}

fn badge(p: f64, result: Option<u32>) -> ObjectPose {
    let mut pose = ObjectPose::at(ObjectKind::Badge, 0.75, 0.55);
    let pop = smoothstep(window(p, 0.0, 0.4));
    let s = 0.6 + 0.4 * pop + 0.15 * (std::f64::consts::PI * pop).sin();
    pose.scale = Vec2::new(s, s);
    pose.opacity = smoothstep(window(p, 0.0, 0.25));
    pose.glyph = result;
    pose
}

#[cfg(test)]
#[path = "../../tests/unit/props/animator.rs"]
mod tests;
