use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{ToonError, ToonResult};

/// Identifier of a detectable body part.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PartId {
    /// Torso; root of the rig.
    Body,
    /// Head, hanging from the body.
    Head,
    /// Left eye, hanging from the head.
    EyeL,
    /// Right eye, hanging from the head.
    EyeR,
    /// Beak, hanging from the head.
    Beak,
    /// Left wing, hanging from the body.
    WingL,
    /// Right wing, hanging from the body.
    WingR,
    /// Left leg, hanging from the body.
    LegL,
    /// Right leg, hanging from the body.
    LegR,
}

impl PartId {
    /// Number of part identifiers.
    pub const COUNT: usize = 9;

    /// Every part, parents before children.
    pub const ALL: [PartId; Self::COUNT] = [
        Self::Body,
        Self::Head,
        Self::EyeL,
        Self::EyeR,
        Self::Beak,
        Self::WingL,
        Self::WingR,
        Self::LegL,
        Self::LegR,
    ];

    /// Dense index in `0..COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parent in the rig hierarchy; `None` for the root.
    pub fn parent(self) -> Option<PartId> {
        match self {
            Self::Body => None,
            Self::Head | Self::WingL | Self::WingR | Self::LegL | Self::LegR => Some(Self::Body),
            Self::EyeL | Self::EyeR | Self::Beak => Some(Self::Head),
        }
    }

    /// Horizontal side: -1 for left parts, +1 for right parts, 0 otherwise.
    pub fn side(self) -> f64 {
        match self {
            Self::EyeL | Self::WingL | Self::LegL => -1.0,
            Self::EyeR | Self::WingR | Self::LegR => 1.0,
            _ => 0.0,
        }
    }
}

/// Bounding shape of a part region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionShape {
    /// Axis-aligned rectangle.
    #[default]
    Rect,
    /// Ellipse inscribed in the bounds.
    Ellipse,
}

/// A detected (or assumed) body-part area in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartRegion {
    /// Which part this is.
    pub part: PartId,
    /// Bounds in source-image pixels.
    pub bounds: Rect,
    /// Shape inscribed in `bounds`.
    #[serde(default)]
    pub shape: RegionShape,
    /// `false` when the detector did not find this part.
    #[serde(default = "present_default")]
    pub present: bool,
}

fn present_default() -> bool {
    true
}

impl PartRegion {
    /// A present region.
    pub fn new(part: PartId, bounds: Rect, shape: RegionShape) -> Self {
        Self {
            part,
            bounds,
            shape,
            present: true,
        }
    }

    /// Placeholder for a part the detector did not find.
    pub fn absent(part: PartId) -> Self {
        Self {
            part,
            bounds: Rect::ZERO,
            shape: RegionShape::Rect,
            present: false,
        }
    }

    /// Pivot used for rotation and scale.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }
}

/// One region per [`PartId`], validated against a canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PartSet {
    canvas: Canvas,
    regions: [PartRegion; PartId::COUNT],
}

impl PartSet {
    /// Fallback rig: the whole image is the body, every other part is absent.
    pub fn whole_image(canvas: Canvas) -> Self {
        let mut regions = PartId::ALL.map(PartRegion::absent);
        regions[PartId::Body.index()] =
            PartRegion::new(PartId::Body, canvas.rect(), RegionShape::Rect);
        Self { canvas, regions }
    }

    /// Build from detector output.
    ///
    /// Bounds are clipped to the canvas. Parts not listed are absent. A missing body falls back
    /// to the whole image so every rig has a root.
    pub fn from_regions(
        canvas: Canvas,
        regions: impl IntoIterator<Item = PartRegion>,
    ) -> ToonResult<Self> {
        let mut out = PartId::ALL.map(PartRegion::absent);
        let mut seen = [false; PartId::COUNT];
        for mut r in regions {
            let i = r.part.index();
            if seen[i] {
                return Err(ToonError::validation(format!(
                    "part {:?} listed more than once",
                    r.part
                )));
            }
            seen[i] = true;
            if !r.present {
                continue;
            }
            let b = r.bounds;
            if ![b.x0, b.y0, b.x1, b.y1].iter().all(|v| v.is_finite()) {
                return Err(ToonError::validation(format!(
                    "part {:?} bounds must be finite",
                    r.part
                )));
            }
            r.bounds = b.abs().intersect(canvas.rect());
            if r.bounds.width() < 1.0 || r.bounds.height() < 1.0 {
                tracing::debug!(part = ?r.part, "part region outside canvas; treating as absent");
                continue;
            }
            out[i] = r;
        }

        if !out[PartId::Body.index()].present {
            tracing::debug!("no body region; using the whole image");
            out[PartId::Body.index()] =
                PartRegion::new(PartId::Body, canvas.rect(), RegionShape::Rect);
        }
        Ok(Self {
            canvas,
            regions: out,
        })
    }

    /// Parse a JSON list of regions.
    pub fn from_reader<R: std::io::Read>(canvas: Canvas, r: R) -> ToonResult<Self> {
        let regions: Vec<PartRegion> = serde_json::from_reader(r)
            .map_err(|e| ToonError::config(format!("parse part regions JSON: {e}")))?;
        Self::from_regions(canvas, regions)
    }

    /// Parse a JSON list of regions from disk.
    pub fn from_path(canvas: Canvas, path: impl AsRef<Path>) -> ToonResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ToonError::config(format!("open part regions JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(canvas, BufReader::new(f))
    }

    /// Canvas the regions live on.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Region for `part`, present or not.
    pub fn get(&self, part: PartId) -> &PartRegion {
        &self.regions[part.index()]
    }

    /// Region for `part` if it was detected.
    pub fn present(&self, part: PartId) -> Option<&PartRegion> {
        let r = self.get(part);
        r.present.then_some(r)
    }

    /// Return `true` when `part` was detected.
    pub fn is_present(&self, part: PartId) -> bool {
        self.get(part).present
    }

    /// Return `true` when only the body is present and it covers the canvas.
    pub fn is_whole_image(&self) -> bool {
        PartId::ALL
            .iter()
            .skip(1)
            .all(|p| !self.is_present(*p))
            && self.get(PartId::Body).bounds == self.canvas.rect()
    }

    /// All regions in [`PartId::ALL`] order.
    pub fn regions(&self) -> &[PartRegion] {
        &self.regions
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/parts.rs"]
mod tests;
