//! Stateless, index-keyed pseudo-random values.
//!
//! Every value here is a pure function of its `(seed, key)` inputs so the same frame index always
//! reproduces the same wobble, grain and prop variation.

use crate::foundation::core::Vec2;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Mix two 64-bit values into one well-distributed key.
pub(crate) fn mix_key(seed: u64, x: u64) -> u64 {
    Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93)).next_u64()
}

/// Uniform value in `[0, 1)` keyed by `(seed, x)`.
pub(crate) fn noise01(seed: u64, x: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

/// Hand-drawn wobble offset for `frame`, inside a disk of `radius` pixels.
pub fn jitter(seed: u64, frame: u64, radius: f64) -> Vec2 {
    if radius.is_nan() || radius <= 0.0 {
        return Vec2::ZERO;
    }
    let mut rng = Rng64::new(mix_key(seed, frame));
    let angle = rng.next_f64_01() * std::f64::consts::TAU;
    let dist = rng.next_f64_01().sqrt() * radius;
    Vec2::new(angle.cos() * dist, angle.sin() * dist)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/noise.rs"]
mod tests;
