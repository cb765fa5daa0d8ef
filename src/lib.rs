//! stillreel turns one still image into a short narrated video.
//!
//! A generation takes an image, optional narration, optional background music, a Ken-Burns-style
//! camera [`Effect`] and an intro [`Transition`], and produces one muxed audio/video artifact while
//! reporting monotonic 0-100 progress:
//!
//! - Describe the job as a [`VideoRequest`] (JSON-loadable)
//! - Run it through a [`RenderSession`] bound to a [`Muxer`] ([`FfmpegMuxer`] for MP4,
//!   [`InMemoryMuxer`] for tests), or call [`generate_video`]
//! - Receive a [`RenderOutput`] holding the [`OutputArtifact`]
//!
//! Assets load in parallel, then the frame renderer and the audio mixer run concurrently against
//! the muxer's inputs until the session duration is covered.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod animation;
mod assets;
mod audio;
mod encode;
mod foundation;
mod render;
mod session;

pub use crate::foundation::core::{Fps, FrameIndex, FrameSize};
pub use crate::foundation::error::{ReelError, ReelErrorKind, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::motion::{Effect, FrameParams, TRANSITION_SPAN, Transition, frame_params};
pub use crate::assets::decode::{
    AudioDecoder, AutoAudioDecoder, FfmpegAudioDecoder, ImageDecoder, RasterImageDecoder,
    WavDecoder,
};
pub use crate::assets::loader::{AssetLoader, LoadedAssets};
pub use crate::assets::media::{DecodedAudio, MIX_SAMPLE_RATE, MediaAsset};
pub use crate::assets::source::MediaSource;
pub use crate::audio::mix::{MixGraph, MixSpec};
pub use crate::audio::narration::{PlaceholderNarration, estimate_duration_secs, placeholder};
pub use crate::audio::track::{AudioTrack, MUSIC_GAIN, NARRATION_GAIN, TrackRole};
pub use crate::encode::ffmpeg::{FfmpegMuxer, ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    AudioSink, AudioStreamConfig, FrameSink, InMemoryMuxer, MuxCapture, MuxConfig, MuxInputs,
    Muxer, OutputArtifact,
};
pub use crate::render::cpu::{FrameRenderer, cover_fit};
pub use crate::render::frame::Frame;
pub use crate::render::schedule::{FrameClock, FrameSchedule, Pacing};
pub use crate::session::cancel::CancelToken;
pub use crate::session::config::{MIN_DURATION_SECS, RenderConfig, VideoRequest};
pub use crate::session::progress::ProgressReporter;
pub use crate::session::render_session::{RenderOutput, RenderSession, RenderStats, generate_video};
