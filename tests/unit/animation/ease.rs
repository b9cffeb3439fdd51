use super::*;

const ALL: [Ease; 2] = [Ease::Smoothstep, Ease::OutCubic];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn out_cubic_front_loads_progress() {
    assert!(Ease::OutCubic.apply(0.25) > Ease::Smoothstep.apply(0.25));
    assert!((Ease::OutCubic.apply(0.5) - 0.875).abs() < 1e-12);
    assert_eq!(Ease::OutCubic.apply(2.0), 1.0);
}

#[test]
fn smoothstep_has_flat_ends() {
    let h = 1e-5;
    let start_slope = (smoothstep(h) - smoothstep(0.0)) / h;
    let end_slope = (smoothstep(1.0) - smoothstep(1.0 - h)) / h;
    assert!(start_slope.abs() < 1e-3);
    assert!(end_slope.abs() < 1e-3);
    assert_eq!(smoothstep(0.5), 0.5);
}

#[test]
fn window_clamps_outside_bounds() {
    assert_eq!(window(0.1, 0.2, 0.6), 0.0);
    assert!((window(0.4, 0.2, 0.6) - 0.5).abs() < 1e-12);
    assert_eq!(window(0.9, 0.2, 0.6), 1.0);
}

#[test]
fn ease_between_hits_both_targets() {
    assert_eq!(ease_between(0.2, 0.2, 0.6, 3.0, 7.0), 3.0);
    assert_eq!(ease_between(0.6, 0.2, 0.6, 3.0, 7.0), 7.0);
    assert!((ease_between(0.4, 0.2, 0.6, 3.0, 7.0) - 5.0).abs() < 1e-9);
}
