use super::*;
use crate::foundation::error::ReelErrorKind;

#[test]
fn default_profile_is_720p30() {
    let cfg = RenderConfig::default();
    assert_eq!(cfg.frame_size, FrameSize::new(1280, 720));
    assert_eq!(cfg.fps, Fps::whole(30));
    assert_eq!(cfg.duration, 10);
    assert_eq!(cfg.pacing, Pacing::Backpressure);
    cfg.validate().unwrap();
}

#[test]
fn parses_wire_form_with_empty_music() {
    let req = VideoRequest::from_json(
        r#"{
            "imageSource": "poster.png",
            "voiceOverSource": "data:audio/wav;base64,AAAA",
            "musicSource": "",
            "effect": "pan-right",
            "transition": "slide-in-left",
            "duration": 4
        }"#,
    )
    .unwrap();
    assert_eq!(req.image_source, MediaSource::path("poster.png"));
    assert!(matches!(req.voice_over_source, Some(MediaSource::DataUri(_))));
    assert!(req.music_source.is_none());
    assert_eq!(req.config.effect, Effect::PanRight);
    assert_eq!(req.config.transition, Transition::SlideInLeft);
    assert_eq!(req.config.duration, 4);
    assert_eq!(req.config.frame_size, FrameSize::new(1280, 720));
    req.validate().unwrap();
}

#[test]
fn null_and_missing_audio_mean_none() {
    let req =
        VideoRequest::from_json(r#"{"imageSource": "a.png", "voiceOverSource": null}"#).unwrap();
    assert!(req.voice_over_source.is_none());
    assert!(req.music_source.is_none());
}

#[test]
fn missing_or_empty_image_is_rejected() {
    let err = VideoRequest::from_json(r#"{"duration": 5}"#).unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Serde);
    let err = VideoRequest::from_json(r#"{"imageSource": " "}"#).unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Serde);
}

#[test]
fn unknown_effect_is_rejected() {
    let err = VideoRequest::from_json(r#"{"imageSource": "a.png", "effect": "spin"}"#).unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Serde);
}

#[test]
fn validate_checks_ranges() {
    let base = RenderConfig::default();
    for cfg in [
        RenderConfig {
            duration: 0,
            ..base.clone()
        },
        RenderConfig {
            frame_size: FrameSize::new(641, 360),
            ..base.clone()
        },
        RenderConfig {
            frame_size: FrameSize::new(0, 360),
            ..base.clone()
        },
        RenderConfig {
            fps: Fps { num: 0, den: 1 },
            ..base.clone()
        },
        RenderConfig {
            channel_capacity: 0,
            ..base.clone()
        },
    ] {
        assert_eq!(cfg.validate().unwrap_err().kind(), ReelErrorKind::Validation);
    }
}

#[test]
fn json_round_trip_keeps_settings() {
    let req = VideoRequest::new(MediaSource::path("still.jpg"))
        .with_music(MediaSource::path("bed.mp3"))
        .with_motion(Effect::ZoomOut, Transition::None)
        .with_duration(7);
    let json = req.to_json().unwrap();
    assert!(json.contains("\"zoom-out\""));
    assert!(json.contains("\"musicSource\""));
    assert!(!json.contains("voiceOverSource"));
    let back = VideoRequest::from_json(&json).unwrap();
    assert_eq!(back.config, req.config);
    assert_eq!(back.music_source, req.music_source);
}

#[test]
fn from_path_resolves_relative_locators() {
    let dir = std::env::temp_dir().join(format!("stillreel_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("request.json");
    std::fs::write(&file, r#"{"imageSource": "img.png", "musicSource": "/abs/bed.wav"}"#).unwrap();

    let req = VideoRequest::from_path(&file).unwrap();
    assert_eq!(req.image_source, MediaSource::path(dir.join("img.png")));
    assert_eq!(req.music_source, Some(MediaSource::path("/abs/bed.wav")));

    let err = VideoRequest::from_path(dir.join("missing.json")).unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Validation);
}

#[test]
fn long_durations_are_accepted() {
    let req = VideoRequest::new(MediaSource::path("still.png")).with_duration(90);
    req.validate().unwrap();

    let schedule = crate::render::schedule::FrameSchedule::for_session(
        req.config.fps,
        req.config.duration,
        None,
    )
    .unwrap();
    assert_eq!(schedule.total_frames(), 2_700);
}
