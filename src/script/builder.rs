use crate::animation::noise::mix_key;
use crate::foundation::error::{ToonError, ToonResult};
use crate::script::model::{
    Action, ActionKind, ActionPlan, Condition, Emotion, ObjectKind, ObjectSpec,
};

/// Programmatic alternative to the description parser.
#[derive(Debug, Default)]
pub struct ActionPlanBuilder {
    actions: Vec<Action>,
}

impl ActionPlanBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a built action.
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Append a bare action of `kind`.
    pub fn then(self, kind: ActionKind) -> Self {
        self.action(Action::new(kind))
    }

    /// Validate and freeze the plan.
    pub fn build(self) -> ToonResult<ActionPlan> {
        ActionPlan::new(self.actions)
    }
}

/// Builder for a single [`Action`].
#[derive(Debug)]
pub struct ActionBuilder {
    kind: ActionKind,
    weight: Option<f64>,
    emotion: Option<Emotion>,
    objects: Vec<ObjectKind>,
    condition: Option<Condition>,
    seed: u64,
}

impl ActionBuilder {
    /// Start an action of `kind` with its base weight.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            weight: None,
            emotion: None,
            objects: Vec::new(),
            condition: None,
            seed: 0,
        }
    }

    /// Override the frame-share weight. Object bonuses are not added on top.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Emotional modifier.
    pub fn emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    /// Attach a prop; repeated kinds collapse.
    pub fn object(mut self, kind: ObjectKind) -> Self {
        self.objects.push(kind);
        self
    }

    /// Outcome shown inside this action's frames.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Seed mixed into every attached object's `params_seed`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate and produce the action.
    pub fn build(self) -> ToonResult<Action> {
        if self.objects.contains(&ObjectKind::Badge) {
            return Err(ToonError::validation(
                "badge objects are emitted by the composer and cannot be attached",
            ));
        }
        let mut action = Action::new(self.kind);
        for (i, kind) in self.objects.into_iter().enumerate() {
            action.attach_object(ObjectSpec {
                kind,
                params_seed: mix_key(self.seed, i as u64),
            });
        }
        if let Some(w) = self.weight {
            if !w.is_finite() || w <= 0.0 {
                return Err(ToonError::validation(format!(
                    "action weight must be finite and > 0, got {w}"
                )));
            }
            action.weight = w;
        }
        action.emotion = self.emotion;
        action.condition = self.condition;
        Ok(action)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/builder.rs"]
mod tests;
