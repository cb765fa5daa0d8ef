use super::*;

#[test]
fn session_duration_takes_longer_of_config_and_narration() {
    assert_eq!(FrameSchedule::session_duration_secs(10.0, None), 10.0);
    assert_eq!(FrameSchedule::session_duration_secs(5.0, Some(8.0)), 8.0);
    assert_eq!(FrameSchedule::session_duration_secs(12.0, Some(3.5)), 12.0);
}

#[test]
fn narration_longer_than_configured_extends_frames() {
    let s = FrameSchedule::for_session(Fps::whole(30), 5, Some(8.0)).unwrap();
    assert_eq!(s.duration_secs(), 8.0);
    assert_eq!(s.total_frames(), 240);
}

#[test]
fn fractional_narration_rounds_frame_count() {
    let s = FrameSchedule::for_session(Fps::whole(30), 1, Some(2.0169)).unwrap();
    assert_eq!(s.total_frames(), 61);
}

#[test]
fn progress_and_timestamps_are_evenly_spaced() {
    let s = FrameSchedule::for_session(Fps::whole(30), 4, None).unwrap();
    assert_eq!(s.total_frames(), 120);
    assert_eq!(s.progress(FrameIndex(0)), 0.0);
    assert!((s.progress(FrameIndex(60)) - 0.5).abs() < 1e-12);
    assert!(s.progress(FrameIndex(119)) < 1.0);

    let mut prev = s.timestamp_secs(FrameIndex(0));
    for idx in s.frames().skip(1) {
        let t = s.timestamp_secs(idx);
        assert!((t - prev - 1.0 / 30.0).abs() < 1e-9);
        prev = t;
    }
}

#[test]
fn completion_is_reached_at_total_frames() {
    let s = FrameSchedule::new(Fps::whole(30), 1.0).unwrap();
    assert!(!s.is_complete(FrameIndex(29)));
    assert!(s.is_complete(FrameIndex(30)));
    assert_eq!(s.frames().count(), 30);
}

#[test]
fn rejects_degenerate_durations() {
    assert!(FrameSchedule::new(Fps::whole(30), 0.0).is_err());
    assert!(FrameSchedule::new(Fps::whole(30), f64::NAN).is_err());
    assert!(FrameSchedule::new(Fps::whole(30), 0.001).is_err());
}

#[test]
fn realtime_clock_spaces_ticks() {
    let mut clock = FrameClock::new(Pacing::Realtime, Duration::from_millis(5));
    let start = Instant::now();
    for tick in 0..4 {
        clock.wait_for(tick);
    }
    assert!(start.elapsed() >= Duration::from_millis(15));
}

#[test]
fn backpressure_clock_does_not_sleep() {
    let mut clock = FrameClock::for_fps(Pacing::Backpressure, Fps::whole(1));
    let start = Instant::now();
    for tick in 0..10 {
        clock.wait_for(tick);
    }
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn clock_interval_is_one_frame() {
    let clock = FrameClock::for_fps(Pacing::Realtime, Fps::whole(25));
    assert_eq!(clock.interval(), Duration::from_millis(40));

    let custom = FrameClock::new(Pacing::Backpressure, Duration::from_millis(100));
    assert_eq!(custom.interval(), Duration::from_millis(100));
}
