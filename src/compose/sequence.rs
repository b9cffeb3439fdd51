//! Sequence Composer: frame-range allocation and per-frame pose/prop evaluation.

use smallvec::SmallVec;

use crate::animation::ease::window;
use crate::animation::noise::mix_key;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ToonError, ToonResult};
use crate::props::animator::{ObjectPose, animate};
use crate::rig::parts::PartSet;
use crate::rig::pose::{EyeState, Pose};
use crate::rig::synth::{SynthOpts, synthesize};
use crate::script::model::{Action, ActionPlan, Condition, ObjectKind, ObjectSpec};

/// Phase from which a numeric result badge is shown on actions without a die.
pub const BADGE_PHASE: f64 = 0.7;
/// Phase from which a success flag adds a celebratory star.
pub const SUCCESS_STAR_PHASE: f64 = 0.6;
/// Phase from which a failure flag closes the eyes.
pub const FAILURE_SQUINT_PHASE: f64 = 0.8;
/// Largest frame count [`compose`] accepts.
pub const MAX_FRAME_COUNT: u32 = 10_000;

/// Frame range owned by one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ActionSpan {
    /// Index into [`ActionPlan::actions`].
    pub action_index: usize,
    /// Owned frames; may be empty when there are fewer frames than actions.
    pub range: FrameRange,
}

/// Everything needed to rasterize one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePlan {
    /// Absolute frame index.
    pub index: FrameIndex,
    /// Owning action.
    pub action_index: usize,
    /// Phase through the owning action's range, in `[0, 1)`.
    pub phase: f64,
    /// Rig state.
    pub pose: Pose,
    /// Active props in draw order.
    pub objects: SmallVec<[ObjectPose; 4]>,
    /// Display time in milliseconds.
    pub duration_ms: u32,
}

/// Fully evaluated animation, ready for the compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Sequence {
    spans: Vec<ActionSpan>,
    frames: Vec<FramePlan>,
}

impl Sequence {
    /// Per-action ranges in plan order; they partition `[0, len)`.
    pub fn spans(&self) -> &[ActionSpan] {
        &self.spans
    }

    /// Frames in index order.
    pub fn frames(&self) -> &[FramePlan] {
        &self.frames
    }

    /// Frame at `f`, if inside the sequence.
    pub fn frame(&self, f: FrameIndex) -> Option<&FramePlan> {
        usize::try_from(f.0).ok().and_then(|i| self.frames.get(i))
    }

    /// Total frame count.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Split `total` frames across `weights` so the shares sum exactly to `total`.
///
/// Shares are `round(total * w / sum)`; the rounding error goes to the last action, spilling
/// back-to-front if that would go negative. When `total >= weights.len()` every action gets at
/// least one frame.
pub fn allocate_ranges(weights: &[f64], total: u32) -> ToonResult<Vec<FrameRange>> {
    if weights.is_empty() {
        return Err(ToonError::validation("cannot allocate frames to zero actions"));
    }
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 || weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ToonError::validation(
            "action weights must be finite, non-negative and not all zero",
        ));
    }

    let n = weights.len();
    let total_i = i64::from(total);
    let mut counts: Vec<i64> = weights
        .iter()
        .map(|w| (f64::from(total) * w / sum).round() as i64)
        .collect();
    let drift = total_i - counts.iter().sum::<i64>();
    if drift != 0 {
        tracing::debug!(drift, "frame shares did not sum to total; adjusting last action");
        counts[n - 1] += drift;
    }
    let mut carry = 0;
    for c in counts.iter_mut().rev() {
        *c -= carry;
        carry = (-*c).max(0);
        *c = (*c).max(0);
    }

    if total_i >= n as i64 {
        while let Some(empty) = counts.iter().position(|c| *c == 0) {
            let mut donor = 0;
            for (i, c) in counts.iter().enumerate() {
                if *c > counts[donor] {
                    donor = i;
                }
            }
            counts[donor] -= 1;
            counts[empty] += 1;
        }
    }

    let mut start = 0u64;
    counts
        .into_iter()
        .map(|c| {
            let end = start + c as u64;
            let r = FrameRange::new(FrameIndex(start), FrameIndex(end));
            start = end;
            r
        })
        .collect()
}

/// Evaluate poses and props for every frame of `plan`.
///
/// `frame_count` and `frame_duration_ms` override the plan's suggestions; zero is rejected, as is
/// a frame count above [`MAX_FRAME_COUNT`].
#[tracing::instrument(skip(plan, parts, synth))]
pub fn compose(
    plan: &ActionPlan,
    parts: &PartSet,
    frame_count: Option<u32>,
    frame_duration_ms: Option<u32>,
    synth: &SynthOpts,
) -> ToonResult<Sequence> {
    let total = frame_count.unwrap_or(plan.suggested_frame_count());
    if total == 0 {
        return Err(ToonError::validation("total frame count must be > 0"));
    }
    if total > MAX_FRAME_COUNT {
        return Err(ToonError::validation(format!(
            "total frame count {total} exceeds the limit of {MAX_FRAME_COUNT}"
        )));
    }
    let duration_ms = frame_duration_ms.unwrap_or(plan.suggested_frame_duration_ms());
    if duration_ms == 0 {
        return Err(ToonError::validation("frame duration must be > 0 ms"));
    }

    let weights: Vec<f64> = plan.actions().iter().map(|a| a.weight).collect();
    let spans: Vec<ActionSpan> = allocate_ranges(&weights, total)?
        .into_iter()
        .enumerate()
        .map(|(action_index, range)| ActionSpan {
            action_index,
            range,
        })
        .collect();

    let mut frames = Vec::with_capacity(total as usize);
    for span in &spans {
        let action = &plan.actions()[span.action_index];
        for f in span.range.start.0..span.range.end.0 {
            let index = FrameIndex(f);
            let phase = span.range.phase_of(index).unwrap_or(0.0);
            let mut pose = synthesize(action, phase, index, parts, synth);
            let objects = resolve_props(action, span.action_index, phase, &mut pose);
            frames.push(FramePlan {
                index,
                action_index: span.action_index,
                phase,
                pose,
                objects,
                duration_ms,
            });
        }
    }

    tracing::debug!(
        frames = frames.len(),
        actions = spans.len(),
        duration_ms,
        "composed sequence"
    );
    Ok(Sequence { spans, frames })
}

fn resolve_props(
    action: &Action,
    action_index: usize,
    phase: f64,
    pose: &mut Pose,
) -> SmallVec<[ObjectPose; 4]> {
    let mut out: SmallVec<[ObjectPose; 4]> = action
        .objects
        .iter()
        .map(|o| animate(o, phase, action.condition))
        .collect();

    let extra = |kind, salt| ObjectSpec {
        kind,
        params_seed: mix_key(action_index as u64, salt),
    };
    match action.condition {
        Some(c @ Condition::NumericResult(_))
            if !action.has_object(ObjectKind::Dice) && phase >= BADGE_PHASE =>
        {
            let local = window(phase, BADGE_PHASE, 1.0);
            out.push(animate(&extra(ObjectKind::Badge, 0xBAD6E), local, Some(c)));
        }
        Some(Condition::OutcomeFlag(true))
            if !action.has_object(ObjectKind::Star) && phase >= SUCCESS_STAR_PHASE =>
        {
            let local = window(phase, SUCCESS_STAR_PHASE, 1.0);
            out.push(animate(&extra(ObjectKind::Star, 0x57A2), local, None));
        }
        Some(Condition::OutcomeFlag(false)) if phase >= FAILURE_SQUINT_PHASE => {
            pose.eye_state = EyeState::Closed;
        }
        _ => {}
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/sequence.rs"]
mod tests;
