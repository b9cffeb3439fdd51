//! Compositor: the only stage that touches pixels.
//!
//! Per frame: backdrop, then the rig parts drawn with their world transforms into a character
//! layer that receives the motion smear, then the props on top.

use std::sync::Arc;

use crate::animation::noise::noise01;
use crate::assets::image::BaseImage;
use crate::compose::sequence::FramePlan;
use crate::foundation::core::{Affine, FrameIndex, Rect, Vec2};
use crate::foundation::error::{ToonError, ToonResult};
use crate::foundation::math::over;
use crate::props::animator::ObjectPose;
use crate::render::frame::FrameRGBA;
use crate::render::smear::smear_rgba8_premul;
use crate::render::sprites::{INK, affine_to_cpu, draw_eye, draw_number, draw_prop};
use crate::rig::parts::{PartId, PartRegion, PartSet, RegionShape};
use crate::rig::pose::Pose;
use crate::script::model::ObjectKind;

/// Back-to-front draw order of the rig.
pub const PART_Z_ORDER: [PartId; PartId::COUNT] = [
    PartId::Body,
    PartId::WingL,
    PartId::WingR,
    PartId::LegL,
    PartId::LegR,
    PartId::Head,
    PartId::EyeL,
    PartId::EyeR,
    PartId::Beak,
];

const GRAIN_SEED: u64 = 0x7A9E_5EED;

/// What sits behind the animated character.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backdrop {
    /// The source still itself.
    BaseImage,
    /// Flat paper colour with per-frame grain, for a hand-drawn look.
    Paper {
        /// Straight-alpha paper colour.
        rgba: [u8; 4],
        /// Maximum per-channel grain deviation.
        grain: u8,
    },
}

/// Knobs for [`Compositor`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Background.
    pub backdrop: Backdrop,
    /// Smear length at full blur strength.
    pub max_smear_px: u32,
    /// Prop size as a fraction of the canvas short side.
    pub prop_size: f64,
    /// Redraw cartoon eyes on detected eye regions.
    pub draw_eyes: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            backdrop: Backdrop::BaseImage,
            max_smear_px: 12,
            prop_size: 0.14,
            draw_eyes: true,
        }
    }
}

impl CompositorOpts {
    /// Reject sizes that cannot be drawn.
    pub fn validate(&self) -> ToonResult<()> {
        if !self.prop_size.is_finite() || self.prop_size <= 0.0 {
            return Err(ToonError::validation(format!(
                "compositor prop_size must be finite and > 0, got {}",
                self.prop_size
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
struct Sprite {
    paint: vello_cpu::Image,
    origin: Vec2,
    width: f64,
    height: f64,
}

struct Prepared {
    width: u16,
    height: u16,
    base: BaseImage,
    parts: PartSet,
    opts: CompositorOpts,
    sprites: [Option<Sprite>; PartId::COUNT],
    lid_rgba: [u8; 4],
}

/// Frame rasterizer. Cloning is cheap; clones share the prepared sprites.
#[derive(Clone)]
pub struct Compositor {
    prepared: Arc<Prepared>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("width", &self.prepared.width)
            .field("height", &self.prepared.height)
            .field("opts", &self.prepared.opts)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Cut part sprites out of `base`.
    pub fn new(base: &BaseImage, parts: &PartSet, opts: CompositorOpts) -> ToonResult<Self> {
        opts.validate()?;
        if parts.canvas() != base.canvas() {
            return Err(ToonError::validation(format!(
                "part regions are for a {}x{} canvas but the image is {}x{}",
                parts.canvas().width,
                parts.canvas().height,
                base.width,
                base.height
            )));
        }
        let width: u16 = base
            .width
            .try_into()
            .map_err(|_| ToonError::render("image width exceeds u16"))?;
        let height: u16 = base
            .height
            .try_into()
            .map_err(|_| ToonError::render("image height exceeds u16"))?;

        let mut sprites: [Option<Sprite>; PartId::COUNT] = Default::default();
        for part in PartId::ALL {
            if let Some(region) = parts.present(part) {
                sprites[part.index()] = cut_sprite(base, region)?;
            }
        }
        let lid_source = parts
            .present(PartId::Head)
            .unwrap_or_else(|| parts.get(PartId::Body));
        let lid_rgba = average_rgba(base, lid_source.bounds);

        Ok(Self {
            prepared: Arc::new(Prepared {
                width,
                height,
                base: base.clone(),
                parts: parts.clone(),
                opts,
                sprites,
                lid_rgba,
            }),
        })
    }

    /// Rasterize a composed frame.
    pub fn render(&self, frame: &FramePlan) -> ToonResult<FrameRGBA> {
        self.render_pose(frame.index, &frame.pose, &frame.objects)
    }

    /// Rasterize `pose` and `objects` over the backdrop.
    pub fn render_pose(
        &self,
        index: FrameIndex,
        pose: &Pose,
        objects: &[ObjectPose],
    ) -> ToonResult<FrameRGBA> {
        let p = self.prepared.as_ref();
        let mut out = backdrop(p, index);

        let mut layer = draw_layer(p, |ctx| draw_rig(ctx, p, pose))?;
        let smear_px =
            (pose.blur_strength.clamp(0.0, 1.0) * f64::from(p.opts.max_smear_px)).round();
        if smear_px >= 1.0 {
            layer = smear_rgba8_premul(
                &layer,
                u32::from(p.width),
                u32::from(p.height),
                pose.blur_axis,
                smear_px as u32,
            )?;
        }
        composite_over(&mut out, &layer);

        if !objects.is_empty() {
            let props = draw_layer(p, |ctx| draw_props(ctx, p, objects))?;
            composite_over(&mut out, &props);
        }

        Ok(FrameRGBA {
            width: u32::from(p.width),
            height: u32::from(p.height),
            data: out,
            premultiplied: true,
        })
    }
}

fn draw_layer(
    p: &Prepared,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> ToonResult<Vec<u8>> {
    let mut ctx = vello_cpu::RenderContext::new(p.width, p.height);
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(p.width, p.height);
    ctx.render_to_pixmap(&mut pixmap);

    let data = pixmap.data_as_u8_slice().to_vec();
    if data.len() != usize::from(p.width) * usize::from(p.height) * 4 {
        return Err(ToonError::render("layer pixmap has unexpected size"));
    }
    Ok(data)
}

fn backdrop(p: &Prepared, index: FrameIndex) -> Vec<u8> {
    match &p.opts.backdrop {
        Backdrop::BaseImage => p.base.rgba8_premul.as_ref().clone(),
        Backdrop::Paper { rgba, grain } => {
            let n = usize::from(p.width) * usize::from(p.height);
            let mut out = Vec::with_capacity(n * 4);
            let g = i32::from(*grain);
            let seed = GRAIN_SEED ^ index.0.wrapping_mul(0x9E37_79B9);
            for i in 0..n {
                let d = (noise01(seed, i as u64) * f64::from(2 * g + 1)) as i32 - g;
                for c in &rgba[..3] {
                    out.push((i32::from(*c) + d).clamp(0, 255) as u8);
                }
                out.push(rgba[3]);
            }
            crate::foundation::math::premultiply_rgba8_in_place(&mut out);
            out
        }
    }
}

fn composite_over(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&out);
    }
}

/// World transform of every part: parent world times local, about each region center.
fn world_transforms(parts: &PartSet, pose: &Pose) -> [Affine; PartId::COUNT] {
    let mut world = [Affine::IDENTITY; PartId::COUNT];
    for part in PartId::ALL {
        let parent = part
            .parent()
            .map_or(Affine::translate(pose.jitter), |pp| world[pp.index()]);
        let local = pose.local(part).to_affine(parts.get(part).center());
        world[part.index()] = parent * local;
    }
    world
}

fn draw_rig(ctx: &mut vello_cpu::RenderContext, p: &Prepared, pose: &Pose) {
    let world = world_transforms(&p.parts, pose);
    for part in PART_Z_ORDER {
        let Some(sprite) = &p.sprites[part.index()] else {
            continue;
        };
        let tr = world[part.index()] * Affine::translate(sprite.origin);
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(sprite.paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sprite.width, sprite.height));

        if p.opts.draw_eyes && matches!(part, PartId::EyeL | PartId::EyeR) {
            let b = p.parts.get(part).bounds;
            let unit = Affine::translate(b.center().to_vec2())
                * Affine::scale_non_uniform(b.width(), b.height());
            draw_eye(ctx, pose.eye_state, world[part.index()] * unit, p.lid_rgba);
        }
    }
}

fn draw_props(ctx: &mut vello_cpu::RenderContext, p: &Prepared, objects: &[ObjectPose]) {
    let (w, h) = (f64::from(p.width), f64::from(p.height));
    let size = p.opts.prop_size * w.min(h);
    for obj in objects {
        let opacity = obj.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            continue;
        }
        let center = Affine::translate((obj.position.x * w, obj.position.y * h));
        let to_px = center
            * Affine::rotate(obj.rotation_deg.to_radians())
            * Affine::scale_non_uniform(size * obj.scale.x, size * obj.scale.y);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        draw_prop(ctx, obj, to_px);
        if let Some(n) = obj.glyph {
            let digit_h = match obj.kind {
                ObjectKind::Badge => 0.55 * size * obj.scale.y,
                _ => 0.6 * size,
            };
            let anchor = match obj.kind {
                ObjectKind::Badge => center,
                _ => center * Affine::translate((0.0, -1.1 * size)),
            };
            draw_number(ctx, anchor * Affine::scale(digit_h), n, INK);
        }
        if opacity < 1.0 {
            ctx.pop_layer();
        }
    }
}

fn cut_sprite(base: &BaseImage, region: &PartRegion) -> ToonResult<Option<Sprite>> {
    let b = region.bounds;
    let x0 = b.x0.floor().max(0.0) as u32;
    let y0 = b.y0.floor().max(0.0) as u32;
    let x1 = (b.x1.ceil() as u32).min(base.width);
    let y1 = (b.y1.ceil() as u32).min(base.height);
    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }
    let (w, h) = (x1 - x0, y1 - y0);
    let (cx, cy) = (b.center().x, b.center().y);
    let (rx, ry) = (b.width() / 2.0, b.height() / 2.0);

    let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
    for y in y0..y1 {
        for x in x0..x1 {
            let mut px = base.pixel(x, y);
            if region.shape == RegionShape::Ellipse {
                let nx = (f64::from(x) + 0.5 - cx) / rx;
                let ny = (f64::from(y) + 0.5 - cy) / ry;
                if nx * nx + ny * ny > 1.0 {
                    px = [0; 4];
                }
            }
            pixels.push(vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            });
        }
    }
    let pw: u16 = w
        .try_into()
        .map_err(|_| ToonError::render("sprite width exceeds u16"))?;
    let ph: u16 = h
        .try_into()
        .map_err(|_| ToonError::render("sprite height exceeds u16"))?;
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, pw, ph, true);
    Ok(Some(Sprite {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        origin: Vec2::new(f64::from(x0), f64::from(y0)),
        width: f64::from(w),
        height: f64::from(h),
    }))
}

/// Mean straight-alpha colour of the opaque pixels inside `bounds`.
fn average_rgba(base: &BaseImage, bounds: Rect) -> [u8; 4] {
    let mut acc = [0u64; 3];
    let mut n = 0u64;
    let x0 = bounds.x0.max(0.0) as u32;
    let y0 = bounds.y0.max(0.0) as u32;
    let x1 = (bounds.x1.max(0.0) as u32).min(base.width);
    let y1 = (bounds.y1.max(0.0) as u32).min(base.height);
    for y in y0..y1 {
        for x in x0..x1 {
            let px = base.pixel(x, y);
            if px[3] < 128 {
                continue;
            }
            let a = u64::from(px[3]);
            for c in 0..3 {
                acc[c] += u64::from(px[c]) * 255 / a;
            }
            n += 1;
        }
    }
    if n == 0 {
        return [255, 214, 90, 255];
    }
    [
        (acc[0] / n) as u8,
        (acc[1] / n) as u8,
        (acc[2] / n) as u8,
        255,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
