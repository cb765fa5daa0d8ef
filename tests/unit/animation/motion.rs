use super::*;

const W: f64 = 1280.0;

fn progress(f: u64, total: u64) -> f64 {
    f as f64 / total as f64
}

#[test]
fn identity_when_nothing_configured() {
    for p in [0.0, 0.05, 0.1, 0.5, 0.99] {
        assert_eq!(
            frame_params(Effect::None, Transition::None, p, W),
            FrameParams::IDENTITY
        );
    }
}

#[test]
fn zoom_in_starts_at_one_and_reaches_max() {
    let total = 1800;
    let first = frame_params(Effect::ZoomIn, Transition::None, 0.0, W);
    assert_eq!(first.scale, 1.0);

    let last = frame_params(Effect::ZoomIn, Transition::None, progress(total - 1, total), W);
    assert!((last.scale - 1.1).abs() < 1e-6, "scale={}", last.scale);
}

#[test]
fn zoom_in_strictly_increases_through_main_window() {
    let total = 300;
    let start = (total as f64 * TRANSITION_SPAN).ceil() as u64;
    let mut prev = frame_params(Effect::ZoomIn, Transition::None, progress(start, total), W).scale;
    for f in (start + 1)..total {
        let s = frame_params(Effect::ZoomIn, Transition::None, progress(f, total), W).scale;
        assert!(s > prev, "frame {f}: {s} <= {prev}");
        prev = s;
    }
}

#[test]
fn zoom_out_mirrors_zoom_in() {
    for p in [0.0, 0.2, 0.55, 0.9] {
        let zin = frame_params(Effect::ZoomIn, Transition::None, p, W).scale;
        let zout = frame_params(Effect::ZoomOut, Transition::None, p, W).scale;
        assert!((zin + zout - 2.1).abs() < 1e-12);
    }
}

#[test]
fn effect_holds_start_pose_during_transition() {
    let a = frame_params(Effect::ZoomOut, Transition::FadeIn, 0.03, W);
    assert_eq!(a.scale, 1.1);
    let b = frame_params(Effect::PanLeft, Transition::None, 0.09, W);
    assert_eq!(b.offset_x, 0.0);
    assert_eq!(b.scale, 1.1);
}

#[test]
fn fade_in_ramps_then_stays_opaque() {
    assert_eq!(frame_params(Effect::None, Transition::FadeIn, 0.0, W).opacity, 0.0);
    let mid = frame_params(Effect::None, Transition::FadeIn, 0.05, W).opacity;
    assert!((mid - 0.5).abs() < 1e-12);
    assert_eq!(frame_params(Effect::None, Transition::FadeIn, 0.1, W).opacity, 1.0);
    for p in [0.2, 0.5, 0.999] {
        assert_eq!(frame_params(Effect::ZoomIn, Transition::FadeIn, p, W).opacity, 1.0);
    }
}

#[test]
fn slide_in_left_starts_off_frame_and_settles() {
    let start = frame_params(Effect::None, Transition::SlideInLeft, 0.0, W);
    assert_eq!(start.offset_x, -W);
    assert_eq!(start.opacity, 1.0);

    let half = frame_params(Effect::None, Transition::SlideInLeft, 0.05, W);
    assert!((half.offset_x - (-W * 0.125)).abs() < 1e-9);

    let done = frame_params(Effect::None, Transition::SlideInLeft, 0.1, W);
    assert_eq!(done.offset_x, 0.0);
}

#[test]
fn pan_right_last_frame_reaches_tenth_of_width() {
    // 4 s at 30 fps.
    let total = 120;
    let last = frame_params(Effect::PanRight, Transition::None, progress(119, total), W);
    assert_eq!(last.scale, 1.1);
    assert!(last.offset_x > 0.0);
    let tolerance = 0.01 * W;
    assert!((last.offset_x - 0.1 * W).abs() < tolerance, "offset={}", last.offset_x);
}

#[test]
fn pan_left_moves_left() {
    let p = frame_params(Effect::PanLeft, Transition::None, 0.8, W);
    assert!(p.offset_x < 0.0);
}

#[test]
fn wire_names_round_trip_through_from_str() {
    for e in [
        Effect::None,
        Effect::ZoomIn,
        Effect::ZoomOut,
        Effect::PanLeft,
        Effect::PanRight,
    ] {
        assert_eq!(e.to_string().parse::<Effect>().unwrap(), e);
    }
    for t in [Transition::None, Transition::FadeIn, Transition::SlideInLeft] {
        assert_eq!(t.to_string().parse::<Transition>().unwrap(), t);
    }
    assert!("spin".parse::<Effect>().is_err());
    assert!("wipe".parse::<Transition>().is_err());
}

#[test]
fn serde_uses_kebab_case() {
    let json = serde_json::to_string(&Effect::PanRight).unwrap();
    assert_eq!(json, "\"pan-right\"");
    let t: Transition = serde_json::from_str("\"slide-in-left\"").unwrap();
    assert_eq!(t, Transition::SlideInLeft);
}
