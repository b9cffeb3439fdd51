//! Procedural prop, eye and digit shapes drawn with `vello_cpu`.
//!
//! Every shape is built in a local frame centered on the origin with a nominal size of one unit;
//! callers position it through the context transform.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::props::animator::ObjectPose;
use crate::rig::pose::EyeState;
use crate::script::model::ObjectKind;

pub(crate) const INK: [u8; 4] = [34, 30, 38, 255];
const PAPER_WHITE: [u8; 4] = [252, 250, 244, 255];
const STAR_GOLD: [u8; 4] = [255, 206, 38, 255];
const HEART_RED: [u8; 4] = [232, 54, 78, 255];
const COIN_GOLD: [u8; 4] = [240, 184, 40, 255];
const COIN_RIM: [u8; 4] = [196, 140, 22, 255];
const BADGE_FILL: [u8; 4] = [255, 248, 214, 255];

/// Segments a..g, bit 0 = a (top), clockwise, g = middle.
const SEVEN_SEGMENT: [u8; 10] = [
    0b011_1111, 0b000_0110, 0b101_1011, 0b100_1111, 0b110_0110, 0b110_1101, 0b111_1101,
    0b000_0111, 0b111_1111, 0b110_1111,
];

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn paint(ctx: &mut vello_cpu::RenderContext, rgba: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
}

fn fill(ctx: &mut vello_cpu::RenderContext, shape: &impl Shape, rgba: [u8; 4]) {
    paint(ctx, rgba);
    ctx.fill_path(&bezpath_to_cpu(&shape.to_path(0.05)));
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: Rect, rgba: [u8; 4]) {
    paint(ctx, rgba);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> kurbo::Ellipse {
    kurbo::Ellipse::new(Point::new(cx, cy), Vec2::new(rx, ry), 0.0)
}

pub(crate) fn star_path(points: usize, outer: f64, inner: f64) -> BezPath {
    let mut path = BezPath::new();
    for i in 0..points * 2 {
        let r = if i % 2 == 0 { outer } else { inner };
        let a = -FRAC_PI_2 + TAU * i as f64 / (points * 2) as f64;
        let p = Point::new(r * a.cos(), r * a.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

pub(crate) fn heart_path() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.42));
    path.curve_to((-0.55, 0.05), (-0.5, -0.45), (0.0, -0.2));
    path.curve_to((0.5, -0.45), (0.55, 0.05), (0.0, 0.42));
    path.close_path();
    path
}

/// Pip centers on a unit die face for values `1..=6`.
pub(crate) fn pip_layout(value: u8) -> &'static [(f64, f64)] {
    const C: f64 = 0.0;
    const O: f64 = 0.25;
    match value {
        1 => &[(C, C)],
        2 => &[(-O, -O), (O, O)],
        3 => &[(-O, -O), (C, C), (O, O)],
        4 => &[(-O, -O), (O, -O), (-O, O), (O, O)],
        5 => &[(-O, -O), (O, -O), (C, C), (-O, O), (O, O)],
        6 => &[(-O, -O), (O, -O), (-O, C), (O, C), (-O, O), (O, O)],
        _ => &[],
    }
}

/// Draw a decimal number centered on the origin, digits one unit tall.
pub(crate) fn draw_number(
    ctx: &mut vello_cpu::RenderContext,
    base: Affine,
    value: u32,
    rgba: [u8; 4],
) {
    let digits: Vec<u8> = value.to_string().bytes().map(|b| b - b'0').collect();
    let cell = 0.62;
    let start = -cell * digits.len() as f64 / 2.0 + cell / 2.0;
    for (i, d) in digits.iter().enumerate() {
        let at = base * Affine::translate((start + cell * i as f64, 0.0));
        ctx.set_transform(affine_to_cpu(at));
        draw_digit(ctx, *d, rgba);
    }
}

fn draw_digit(ctx: &mut vello_cpu::RenderContext, digit: u8, rgba: [u8; 4]) {
    let Some(mask) = SEVEN_SEGMENT.get(usize::from(digit)) else {
        return;
    };
    let (w, h, t) = (0.24, 0.5, 0.09);
    let segments = [
        Rect::new(-w, -h, w, -h + t),
        Rect::new(w - t, -h, w, 0.0),
        Rect::new(w - t, 0.0, w, h),
        Rect::new(-w, h - t, w, h),
        Rect::new(-w, 0.0, -w + t, h),
        Rect::new(-w, -h, -w + t, 0.0),
        Rect::new(-w, -t / 2.0, w, t / 2.0),
    ];
    for (bit, seg) in segments.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            fill_rect(ctx, *seg, rgba);
        }
    }
}

/// Draw one prop. `to_px` maps the prop's unit frame to canvas pixels.
pub(crate) fn draw_prop(ctx: &mut vello_cpu::RenderContext, obj: &ObjectPose, to_px: Affine) {
    ctx.set_transform(affine_to_cpu(to_px));
    match obj.kind {
        ObjectKind::Dice => {
            let body = Rect::new(-0.5, -0.5, 0.5, 0.5);
            fill(ctx, &body.to_rounded_rect(0.14), INK);
            fill(ctx, &body.inset(-0.06).to_rounded_rect(0.1), PAPER_WHITE);
            for &(x, y) in pip_layout(obj.pips) {
                fill(ctx, &ellipse(x, y, 0.085, 0.085), INK);
            }
        }
        ObjectKind::Star => {
            fill(ctx, &star_path(5, 0.55, 0.24), INK);
            fill(ctx, &star_path(5, 0.45, 0.19), STAR_GOLD);
        }
        ObjectKind::Heart => {
            fill(ctx, &heart_path(), HEART_RED);
        }
        ObjectKind::Coin => {
            fill(ctx, &ellipse(0.0, 0.0, 0.5, 0.5), COIN_RIM);
            fill(ctx, &ellipse(0.0, 0.0, 0.4, 0.4), COIN_GOLD);
        }
        ObjectKind::Badge => {
            fill(ctx, &ellipse(0.0, 0.0, 0.6, 0.6), INK);
            fill(ctx, &ellipse(0.0, 0.0, 0.53, 0.53), BADGE_FILL);
        }
    }
}

/// Draw a cartoon eye filling the unit square centered on the origin.
pub(crate) fn draw_eye(
    ctx: &mut vello_cpu::RenderContext,
    state: EyeState,
    to_px: Affine,
    lid_rgba: [u8; 4],
) {
    ctx.set_transform(affine_to_cpu(to_px));
    match state {
        EyeState::Closed => {
            fill(ctx, &ellipse(0.0, 0.0, 0.5, 0.5), lid_rgba);
            fill(ctx, &ellipse(0.0, 0.08, 0.46, 0.07), INK);
        }
        EyeState::Open => {
            fill(ctx, &ellipse(0.0, 0.0, 0.5, 0.5), PAPER_WHITE);
            fill(ctx, &ellipse(0.0, 0.05, 0.3, 0.3), INK);
            fill(ctx, &ellipse(-0.1, -0.06, 0.08, 0.08), PAPER_WHITE);
        }
        EyeState::Wide => {
            fill(ctx, &ellipse(0.0, 0.0, 0.65, 0.65), INK);
            fill(ctx, &ellipse(0.0, 0.0, 0.6, 0.6), PAPER_WHITE);
            fill(ctx, &ellipse(0.0, 0.0, 0.2, 0.2), INK);
        }
        EyeState::Sparkle => {
            fill(ctx, &ellipse(0.0, 0.0, 0.5, 0.5), PAPER_WHITE);
            fill(ctx, &ellipse(0.0, 0.04, 0.34, 0.34), INK);
            fill(
                ctx,
                &(Affine::translate((-0.1, -0.08)) * star_path(4, 0.16, 0.05)),
                PAPER_WHITE,
            );
            fill(ctx, &ellipse(0.13, 0.14, 0.05, 0.05), PAPER_WHITE);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sprites.rs"]
mod tests;
