use crate::foundation::core::Vec2;
use crate::foundation::error::{ToonError, ToonResult};

/// Directional box smear over a premultiplied RGBA8 buffer.
///
/// Each output pixel averages `length + 1` samples taken along `axis`, centered on the pixel,
/// with edge clamping. A zero length or a zero axis returns the input unchanged.
pub fn smear_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    axis: Vec2,
    length: u32,
) -> ToonResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ToonError::render("smear buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(ToonError::render(
            "smear_rgba8_premul expects src matching width*height*4",
        ));
    }
    let len = axis.hypot();
    if length == 0 || !len.is_finite() || len == 0.0 {
        return Ok(src.to_vec());
    }
    let dir = axis / len;

    let half = f64::from(length) / 2.0;
    let taps: Vec<(i32, i32)> = (0..=length)
        .map(|i| {
            let t = f64::from(i) - half;
            ((dir.x * t).round() as i32, (dir.y * t).round() as i32)
        })
        .collect();
    let n = taps.len() as u32;

    let w = width as i32;
    let h = height as i32;
    let mut out = vec![0u8; expected_len];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 4];
            for &(dx, dy) in &taps {
                let sx = (x + dx).clamp(0, w - 1);
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u32::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                out[out_idx + c] = ((acc[c] + n / 2) / n).min(255) as u8;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/smear.rs"]
mod tests;
