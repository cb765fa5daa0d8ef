use super::*;
use crate::encode::sink::AudioStreamConfig;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::ReelErrorKind;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stillreel_unit_{}_{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cfg(width: u32, height: u32, audio: bool) -> MuxConfig {
    MuxConfig {
        size: FrameSize::new(width, height),
        fps: Fps::whole(30),
        total_frames: 6,
        audio: audio.then_some(AudioStreamConfig {
            sample_rate: 48_000,
            channels: 2,
        }),
    }
}

#[test]
fn temp_file_guard_removes_file() {
    let path = scratch_dir("guard").join("x.bin");
    std::fs::write(&path, b"abc").unwrap();
    drop(TempFileGuard(Some(path.clone())));
    assert!(!path.exists());
}

#[test]
fn spool_sink_writes_little_endian_f32() {
    let path = scratch_dir("spool").join("a.f32le");
    let file = File::create(&path).unwrap();
    let mut sink = SpoolAudioSink {
        writer: Some(BufWriter::new(file)),
    };
    sink.write_samples(&[0.5, -1.0]).unwrap();
    sink.end().unwrap();
    assert!(sink.write_samples(&[0.0]).is_err());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0.5);
    assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), -1.0);
}

#[test]
fn odd_sizes_are_rejected_before_probing() {
    let mut mux = FfmpegMuxer::with_work_dir(scratch_dir("odd"));
    let err = mux.open(&cfg(63, 36, false)).unwrap_err();
    assert_eq!(err.kind(), ReelErrorKind::Validation);
}

#[test]
fn finalize_without_open_fails() {
    let mut mux = FfmpegMuxer::new();
    assert_eq!(mux.finalize().unwrap_err().kind(), ReelErrorKind::Encode);
}

#[test]
fn encodes_and_muxes_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }
    let dir = scratch_dir("mux");
    let mut mux = FfmpegMuxer::with_work_dir(&dir);
    let cfg = cfg(32, 18, true);
    let MuxInputs { mut video, audio } = mux.open(&cfg).unwrap();
    let mut audio = audio.unwrap();

    video.begin(&cfg).unwrap();
    for i in 0..6 {
        video
            .push_frame(&Frame {
                index: FrameIndex(i),
                timestamp_secs: i as f64 / 30.0,
                width: 32,
                height: 18,
                data: [40, 80, 120, 255].repeat(32 * 18),
            })
            .unwrap();
    }
    video.end().unwrap();
    audio.write_samples(&vec![0.0; 2 * 9_600]).unwrap();
    audio.end().unwrap();

    let artifact = mux.finalize().unwrap();
    assert_eq!(artifact.mime, "video/mp4");
    assert_eq!(&artifact.bytes[4..8], b"ftyp");

    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("stillreel_"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

const ENCODERS_LISTING: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 S..... = Subtitle
 .F.... = Frame-level multithreading
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 V....D mpeg4                MPEG-4 part 2
 A....D aac                  AAC (Advanced Audio Coding)
 A....D libopus              libopus Opus (codec opus)
";

#[test]
fn encoder_listing_with_h264_and_aac_is_complete() {
    assert!(missing_encoders(ENCODERS_LISTING, &REQUIRED_ENCODERS).is_empty());
}

#[test]
fn encoder_listing_reports_missing_encoders() {
    let without_x264: String = ENCODERS_LISTING
        .lines()
        .filter(|l| !l.contains("libx264"))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(
        missing_encoders(&without_x264, &REQUIRED_ENCODERS),
        vec!["libx264"]
    );

    // Descriptions and legend rows never count as encoder names.
    let only_descriptions = " V....D mpeg4   fallback for libx264 and aac users\n A..... = aac";
    assert_eq!(
        missing_encoders(only_descriptions, &REQUIRED_ENCODERS),
        vec!["libx264", "aac"]
    );
    assert_eq!(missing_encoders("", &["aac"]), vec!["aac"]);
}

#[test]
fn mux_without_mix_adds_a_silent_aac_track() {
    let args: Vec<String> = mux_args(
        Path::new("v.mp4"),
        &AudioInput::Silence,
        Path::new("out.mp4"),
    )
    .iter()
    .map(|a| a.to_string_lossy().into_owned())
    .collect();
    let lavfi = args.iter().position(|a| a == "lavfi").unwrap();
    assert_eq!(args[lavfi + 2], "anullsrc=r=48000:cl=stereo");
    assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
    assert!(args.iter().any(|a| a == "-shortest"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn mux_with_mix_reads_the_spooled_samples() {
    let args: Vec<String> = mux_args(
        Path::new("v.mp4"),
        &AudioInput::Spool {
            path: Path::new("a.f32le"),
            stream: AudioStreamConfig {
                sample_rate: 48_000,
                channels: 2,
            },
        },
        Path::new("out.mp4"),
    )
    .iter()
    .map(|a| a.to_string_lossy().into_owned())
    .collect();
    assert!(args.windows(2).any(|w| w == ["-f", "f32le"]));
    assert!(args.windows(2).any(|w| w == ["-i", "a.f32le"]));
    assert!(!args.iter().any(|a| a == "lavfi"));
}

#[test]
fn silent_mux_still_carries_audio_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }
    let dir = scratch_dir("silent");
    let mut mux = FfmpegMuxer::with_work_dir(&dir);
    let cfg = cfg(32, 18, false);
    let MuxInputs { mut video, audio } = mux.open(&cfg).unwrap();
    assert!(audio.is_none());

    video.begin(&cfg).unwrap();
    for i in 0..6 {
        video
            .push_frame(&Frame {
                index: FrameIndex(i),
                timestamp_secs: i as f64 / 30.0,
                width: 32,
                height: 18,
                data: [10, 20, 30, 255].repeat(32 * 18),
            })
            .unwrap();
    }
    video.end().unwrap();

    let artifact = mux.finalize().unwrap();
    assert_eq!(&artifact.bytes[4..8], b"ftyp");
    assert!(artifact.bytes.windows(4).any(|w| w == b"mp4a"));
}
