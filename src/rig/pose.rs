use crate::foundation::core::{Affine, Point, Vec2};
use crate::rig::parts::PartId;

/// Local transform of one part, applied about the part's region center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartTransform {
    /// Offset in pixels (y down).
    pub translate: Vec2,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Per-axis scale; squash-and-stretch keeps `x * y == 1`.
    pub scale: Vec2,
}

impl Default for PartTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartTransform {
    /// No motion.
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        rotation_deg: 0.0,
        scale: Vec2::new(1.0, 1.0),
    };

    /// Pure translation.
    pub fn offset(dx: f64, dy: f64) -> Self {
        Self {
            translate: Vec2::new(dx, dy),
            ..Self::IDENTITY
        }
    }

    /// Pure rotation.
    pub fn rotation(deg: f64) -> Self {
        Self {
            rotation_deg: deg,
            ..Self::IDENTITY
        }
    }

    /// Volume-preserving deformation: vertical factor `k`, horizontal `1/k`.
    pub fn with_squash(mut self, k: f64) -> Self {
        self.scale = Vec2::new(1.0 / k, k);
        self
    }

    /// Scale then rotate about `pivot`, then translate.
    pub fn to_affine(&self, pivot: Point) -> Affine {
        let c = pivot.to_vec2();
        Affine::translate(c + self.translate)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-c)
    }
}

/// Expression drawn on the eye regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeState {
    /// Normal round eyes.
    #[default]
    Open,
    /// Lids shut.
    Closed,
    /// Enlarged pupils.
    Wide,
    /// Starry highlights.
    Sparkle,
}

/// Complete per-frame rig state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    transforms: [Option<PartTransform>; PartId::COUNT],
    /// Expression for both eyes.
    pub eye_state: EyeState,
    /// Motion smear strength, `>= 0`. Zero means no smear.
    pub blur_strength: f64,
    /// Unit direction of the smear.
    pub blur_axis: Vec2,
    /// Hand-drawn wobble added to the root.
    pub jitter: Vec2,
}

impl Default for Pose {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Pose {
    /// Rest pose with no part transforms.
    pub fn neutral() -> Self {
        Self {
            transforms: [None; PartId::COUNT],
            eye_state: EyeState::Open,
            blur_strength: 0.0,
            blur_axis: Vec2::new(0.0, 1.0),
            jitter: Vec2::ZERO,
        }
    }

    /// Local transform for `part`, `None` when the part does not move or is absent.
    pub fn get(&self, part: PartId) -> Option<&PartTransform> {
        self.transforms[part.index()].as_ref()
    }

    /// Set the local transform of `part`.
    pub fn set(&mut self, part: PartId, t: PartTransform) {
        self.transforms[part.index()] = Some(t);
    }

    /// Local transform of `part` or identity.
    pub fn local(&self, part: PartId) -> PartTransform {
        self.get(part).copied().unwrap_or(PartTransform::IDENTITY)
    }

    /// Parts carrying a transform.
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &PartTransform)> {
        PartId::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|t| (*p, t)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/pose.rs"]
mod tests;
