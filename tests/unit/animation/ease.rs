use super::*;

const ALL: [Ease; 3] = [Ease::Linear, Ease::InOutQuad, Ease::OutCubic];

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
fn in_out_quad_is_continuous_and_symmetric() {
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
    for t in [0.1, 0.2, 0.3, 0.4] {
        let lo = Ease::InOutQuad.apply(t);
        let hi = Ease::InOutQuad.apply(1.0 - t);
        assert!((lo + hi - 1.0).abs() < 1e-12);
    }
}

#[test]
fn out_cubic_front_loads_progress() {
    assert!((Ease::OutCubic.apply(0.5) - 0.875).abs() < 1e-12);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InOutQuad.apply(7.0), 1.0);
}

#[test]
fn linear_is_identity_inside_the_unit_range() {
    for t in [0.0, 0.1, 0.37, 0.5, 0.9, 1.0] {
        assert_eq!(Ease::Linear.apply(t), t);
    }
    assert_eq!(Ease::Linear.apply(-0.5), 0.0);
    assert_eq!(Ease::Linear.apply(2.0), 1.0);
}
