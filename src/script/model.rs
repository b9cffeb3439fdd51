use crate::foundation::error::{ToonError, ToonResult};

/// Lower clamp for [`ActionPlan::suggested_frame_count`].
pub const MIN_SUGGESTED_FRAMES: u32 = 15;
/// Upper clamp for [`ActionPlan::suggested_frame_count`].
pub const MAX_SUGGESTED_FRAMES: u32 = 40;

const FRAMES_PER_WEIGHT: f64 = 10.0;
const FRAMES_PER_ACTION: u32 = 5;
const FRAMES_PER_OBJECT: u32 = 2;
const WEIGHT_PER_OBJECT: f64 = 0.2;

/// Verb-level behaviour with its own pose rule.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Exaggerated waddle with leg swing and body bob.
    Walk,
    /// Anticipation, rise, overshoot and settle.
    Jump,
    /// Fast wing beats over a slow hover.
    Fly,
    /// Breathing with an occasional head turn.
    Idle,
    /// Tumbling bounce with sparkling eyes.
    Roll,
    /// Celebration bounce (also used for "excited").
    Cheer,
    /// Standing still while the eyes close and reopen.
    Blink,
}

impl ActionKind {
    /// Every action kind, in declaration order.
    pub const ALL: [ActionKind; 7] = [
        Self::Walk,
        Self::Jump,
        Self::Fly,
        Self::Idle,
        Self::Roll,
        Self::Cheer,
        Self::Blink,
    ];

    /// Base complexity weight used for frame shares and frame-count suggestions.
    pub fn base_weight(self) -> f64 {
        match self {
            Self::Cheer => 1.5,
            Self::Fly => 1.4,
            Self::Jump => 1.2,
            Self::Walk => 1.1,
            Self::Roll => 1.0,
            Self::Idle => 0.8,
            Self::Blink => 0.6,
        }
    }

    /// Calm actions that orphaned props may attach to.
    pub fn is_idle_like(self) -> bool {
        matches!(self, Self::Idle | Self::Blink)
    }
}

/// Emotional colouring of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Slightly livelier motion.
    Happy,
    /// Noticeably bigger motion.
    Excited,
    /// Damped motion.
    Sad,
    /// Wide-open eyes.
    Surprised,
}

impl Emotion {
    /// Multiplier applied to motion amplitudes.
    pub fn amplitude(self) -> f64 {
        match self {
            Self::Happy => 1.1,
            Self::Excited => 1.25,
            Self::Sad => 0.7,
            Self::Surprised => 1.0,
        }
    }
}

/// Kind of animated prop.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Rolling die that comes to rest, optionally showing a result.
    Dice,
    /// Orbiting, pulsing star.
    Star,
    /// Rising, fading heart.
    Heart,
    /// Spinning coin.
    Coin,
    /// Floating result number. Never produced by the parser; the composer emits it for numeric
    /// results on actions without a die.
    Badge,
}

/// A prop attached to an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ObjectSpec {
    /// What to draw.
    pub kind: ObjectKind,
    /// Per-instance variation seed (orbit offset, drift lane, idle die faces).
    pub params_seed: u64,
}

/// Outcome attached to an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// A number to show, e.g. the die result.
    NumericResult(u32),
    /// Success (`true`) or failure (`false`).
    OutcomeFlag(bool),
}

/// One recognized action with its modifiers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    /// Pose rule to use.
    pub kind: ActionKind,
    /// Relative share of the total frame count.
    pub weight: f64,
    /// Optional emotional modifier.
    #[serde(default)]
    pub emotion: Option<Emotion>,
    /// Attached props, at most one per kind.
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    /// Optional outcome rendered inside this action's frame range.
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl Action {
    /// Bare action of `kind` with its base weight.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            weight: kind.base_weight(),
            emotion: None,
            objects: Vec::new(),
            condition: None,
        }
    }

    /// Attach an object unless one of the same kind is already attached.
    ///
    /// Returns `true` when the object was added. The weight grows with every added object.
    pub fn attach_object(&mut self, object: ObjectSpec) -> bool {
        if self.has_object(object.kind) {
            return false;
        }
        self.objects.push(object);
        self.weight += WEIGHT_PER_OBJECT;
        true
    }

    /// Return `true` when a prop of `kind` is attached.
    pub fn has_object(&self, kind: ObjectKind) -> bool {
        self.objects.iter().any(|o| o.kind == kind)
    }

    /// Suggested frame quota for this action alone.
    pub fn frame_quota(&self) -> u32 {
        // Anything past the upper clamp behaves the same, so cap before the cast.
        let base = (self.weight * FRAMES_PER_WEIGHT)
            .round()
            .clamp(0.0, f64::from(MAX_SUGGESTED_FRAMES)) as u32;
        let objects = u32::try_from(self.objects.len()).unwrap_or(u32::MAX);
        base.saturating_add(FRAMES_PER_ACTION)
            .saturating_add(FRAMES_PER_OBJECT.saturating_mul(objects))
    }

    /// Combined amplitude multiplier from the emotion.
    pub fn amplitude(&self) -> f64 {
        self.emotion.map_or(1.0, Emotion::amplitude)
    }
}

/// Ordered, immutable action plan produced by the parser.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ActionPlanDef")]
pub struct ActionPlan {
    actions: Vec<Action>,
    suggested_frame_count: u32,
    suggested_frame_duration_ms: u32,
}

#[derive(serde::Deserialize)]
struct ActionPlanDef {
    actions: Vec<Action>,
}

impl TryFrom<ActionPlanDef> for ActionPlan {
    type Error = ToonError;

    fn try_from(def: ActionPlanDef) -> ToonResult<Self> {
        Self::new(def.actions)
    }
}

impl ActionPlan {
    /// Validate `actions` and derive the frame-count and frame-duration suggestions.
    pub fn new(actions: Vec<Action>) -> ToonResult<Self> {
        if actions.is_empty() {
            return Err(ToonError::validation("action plan needs at least one action"));
        }
        for (i, a) in actions.iter().enumerate() {
            if !a.weight.is_finite() || a.weight <= 0.0 {
                return Err(ToonError::validation(format!(
                    "action {i} ({:?}) weight must be finite and > 0, got {}",
                    a.kind, a.weight
                )));
            }
        }
        Ok(Self::from_checked(actions))
    }

    /// Actions must be non-empty with positive finite weights.
    pub(crate) fn from_checked(actions: Vec<Action>) -> Self {
        debug_assert!(!actions.is_empty());
        let suggested_frame_count = suggest_frame_count(&actions);
        let suggested_frame_duration_ms = suggest_frame_duration_ms(actions.len());
        Self {
            actions,
            suggested_frame_count,
            suggested_frame_duration_ms,
        }
    }

    /// Actions in source order. Never empty.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Suggested total frame count.
    pub fn suggested_frame_count(&self) -> u32 {
        self.suggested_frame_count
    }

    /// Suggested per-frame duration in milliseconds.
    pub fn suggested_frame_duration_ms(&self) -> u32 {
        self.suggested_frame_duration_ms
    }

    /// Sum of all action weights.
    pub fn total_weight(&self) -> f64 {
        self.actions.iter().map(|a| a.weight).sum()
    }
}

/// Sum of per-action quotas clamped to
/// [`MIN_SUGGESTED_FRAMES`]..=[`MAX_SUGGESTED_FRAMES`].
pub fn suggest_frame_count(actions: &[Action]) -> u32 {
    let sum = actions
        .iter()
        .map(Action::frame_quota)
        .fold(0u32, u32::saturating_add);
    sum.clamp(MIN_SUGGESTED_FRAMES, MAX_SUGGESTED_FRAMES)
}

/// Fewer actions play slower; long plans speed up to keep playtime bounded.
pub fn suggest_frame_duration_ms(action_count: usize) -> u32 {
    match action_count {
        0 | 1 => 80,
        2 | 3 => 70,
        _ => 60,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
