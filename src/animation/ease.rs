/// Named easing curves for normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Cubic smoothstep `t²(3 - 2t)`: zero velocity at both ends.
    Smoothstep,
    /// Cubic ease-out: fast start, settles at the target.
    OutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Smoothstep => smoothstep(t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Cubic smoothstep on `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Local progress of `phase` through the window `[start, end)`, clamped to `[0, 1]`.
pub fn window(phase: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return if phase >= end { 1.0 } else { 0.0 };
    }
    ((phase - start) / (end - start)).clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smoothstep-eased interpolation from `a` to `b` across `[start, end)`.
pub fn ease_between(phase: f64, start: f64, end: f64, a: f64, b: f64) -> f64 {
    lerp(a, b, Ease::Smoothstep.apply(window(phase, start, end)))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
