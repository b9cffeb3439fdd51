use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn noise_is_bounded_and_keyed() {
    for x in 0..64 {
        let v = noise01(7, x);
        assert!((0.0..1.0).contains(&v));
        assert_eq!(v, noise01(7, x));
    }
    assert_ne!(noise01(7, 0), noise01(7, 1));
    assert_ne!(noise01(7, 0), noise01(8, 0));
}

#[test]
fn jitter_stays_inside_radius_and_repeats_per_frame() {
    let radius = 1.5;
    for frame in 0..200 {
        let j = jitter(42, frame, radius);
        assert!(j.hypot() <= radius + 1e-12);
        assert_eq!(j, jitter(42, frame, radius));
    }
    assert_ne!(jitter(42, 3, radius), jitter(42, 4, radius));
}

#[test]
fn zero_radius_disables_jitter() {
    assert_eq!(jitter(1, 9, 0.0), Vec2::ZERO);
    assert_eq!(jitter(1, 9, f64::NAN), Vec2::ZERO);
}
