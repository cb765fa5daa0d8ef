use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::{Fps, FrameIndex, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::Frame;

/// Layout of the mixed audio stream handed to an [`AudioSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioStreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

/// Configuration provided to a [`Muxer`] when a session opens its inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct MuxConfig {
    /// Output frame size.
    pub size: FrameSize,
    /// Output frame rate.
    pub fps: Fps,
    /// Number of frames the session will push.
    pub total_frames: u64,
    /// Audio stream layout; `None` when the session has no mix. Container muxers may still emit a
    /// silent track.
    pub audio: Option<AudioStreamConfig>,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, and
/// `begin` is called before the renderer produces its first frame.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: &MuxConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

/// Sink contract for the mixed audio stream.
pub trait AudioSink: Send {
    /// Append interleaved samples in stream order.
    fn write_samples(&mut self, interleaved: &[f32]) -> ReelResult<()>;
    /// Called once after the last chunk.
    fn end(&mut self) -> ReelResult<()>;
}

/// The two live inputs a muxer exposes to a session.
pub struct MuxInputs {
    /// Frame input, driven from the encoder thread.
    pub video: Box<dyn FrameSink>,
    /// Audio input; present iff [`MuxConfig::audio`] was set.
    pub audio: Option<Box<dyn AudioSink>>,
}

impl std::fmt::Debug for MuxInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxInputs")
            .field("audio", &self.audio.is_some())
            .finish_non_exhaustive()
    }
}

/// Final encoded result. Ownership passes to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Encoded container bytes.
    pub bytes: Vec<u8>,
    /// Declared container type, e.g. `video/mp4`.
    pub mime: String,
}

/// Container writer that combines one frame stream and one audio stream.
///
/// Lifecycle: `open` once, drive both inputs to `end`, then either `finalize` (success) or
/// `abort` (any failure or cancellation). `finalize` yields the artifact exactly once.
pub trait Muxer: Send {
    /// Prepare the container and hand out its inputs.
    ///
    /// Fails with [`ReelError::EncoderUnavailable`] when the host cannot produce the container.
    fn open(&mut self, cfg: &MuxConfig) -> ReelResult<MuxInputs>;
    /// Produce the artifact after both inputs ended.
    fn finalize(&mut self) -> ReelResult<OutputArtifact>;
    /// Release everything without producing an artifact.
    fn abort(&mut self);
}

/// What an [`InMemoryMuxer`] observed. Shared between the muxer and its inputs.
#[derive(Debug, Default)]
pub struct MuxCapture {
    /// Configuration received by `open`.
    pub config: Option<MuxConfig>,
    /// Frames in the order they were pushed.
    pub frames: Vec<Frame>,
    /// Interleaved audio in the order it was written.
    pub audio: Vec<f32>,
    /// Frame input saw `begin`.
    pub video_begun: bool,
    /// Frame input saw `end`.
    pub video_ended: bool,
    /// Audio input saw `end`.
    pub audio_ended: bool,
    /// Number of successful `finalize` calls.
    pub finalized: u32,
    /// `abort` was called.
    pub aborted: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct Faults {
    unavailable: bool,
    fail_at_frame: Option<u64>,
}

/// Muxer that keeps every frame and sample in memory, for tests and previews.
///
/// The artifact is a small JSON summary with mime `application/json`.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMuxer {
    capture: Arc<Mutex<MuxCapture>>,
    faults: Faults,
}

impl InMemoryMuxer {
    /// Create a muxer with an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open` fail with [`ReelError::EncoderUnavailable`].
    pub fn unavailable(mut self) -> Self {
        self.faults.unavailable = true;
        self
    }

    /// Make the frame input fail with [`ReelError::Encode`] when frame `index` arrives.
    pub fn fail_at_frame(mut self, index: u64) -> Self {
        self.faults.fail_at_frame = Some(index);
        self
    }

    /// Shared handle to the capture; stays valid after the muxer is consumed.
    pub fn capture(&self) -> Arc<Mutex<MuxCapture>> {
        Arc::clone(&self.capture)
    }
}

fn lock(capture: &Mutex<MuxCapture>) -> MutexGuard<'_, MuxCapture> {
    capture.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Muxer for InMemoryMuxer {
    fn open(&mut self, cfg: &MuxConfig) -> ReelResult<MuxInputs> {
        if self.faults.unavailable {
            return Err(ReelError::encoder_unavailable(
                "in-memory muxer configured as unavailable",
            ));
        }
        {
            let mut cap = lock(&self.capture);
            *cap = MuxCapture {
                config: Some(cfg.clone()),
                ..MuxCapture::default()
            };
        }
        let video = Box::new(InMemoryFrameSink {
            capture: Arc::clone(&self.capture),
            fail_at_frame: self.faults.fail_at_frame,
            last_idx: None,
        });
        let audio = cfg.audio.map(|_| {
            Box::new(InMemoryAudioSink {
                capture: Arc::clone(&self.capture),
            }) as Box<dyn AudioSink>
        });
        Ok(MuxInputs { video, audio })
    }

    fn finalize(&mut self) -> ReelResult<OutputArtifact> {
        let mut cap = lock(&self.capture);
        if cap.config.is_none() {
            return Err(ReelError::encode("in-memory muxer was never opened"));
        }
        if cap.finalized > 0 {
            return Err(ReelError::encode("artifact was already produced"));
        }
        if !cap.video_ended {
            return Err(ReelError::encode("frame input did not end"));
        }
        let summary = serde_json::json!({
            "frames": cap.frames.len(),
            "audio_samples": cap.audio.len(),
        });
        let bytes = serde_json::to_vec(&summary).map_err(|e| ReelError::serde(e.to_string()))?;
        cap.finalized += 1;
        Ok(OutputArtifact {
            bytes,
            mime: "application/json".to_owned(),
        })
    }

    fn abort(&mut self) {
        lock(&self.capture).aborted = true;
    }
}

struct InMemoryFrameSink {
    capture: Arc<Mutex<MuxCapture>>,
    fail_at_frame: Option<u64>,
    last_idx: Option<FrameIndex>,
}

impl FrameSink for InMemoryFrameSink {
    fn begin(&mut self, _cfg: &MuxConfig) -> ReelResult<()> {
        lock(&self.capture).video_begun = true;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()> {
        if let Some(last) = self.last_idx
            && frame.index <= last
        {
            return Err(ReelError::encode("received out-of-order frame index"));
        }
        self.last_idx = Some(frame.index);
        if self.fail_at_frame == Some(frame.index.0) {
            return Err(ReelError::encode(format!(
                "injected failure at frame {}",
                frame.index.0
            )));
        }
        let mut cap = lock(&self.capture);
        if !cap.video_begun {
            return Err(ReelError::encode("frame pushed before begin"));
        }
        cap.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        lock(&self.capture).video_ended = true;
        Ok(())
    }
}

struct InMemoryAudioSink {
    capture: Arc<Mutex<MuxCapture>>,
}

impl AudioSink for InMemoryAudioSink {
    fn write_samples(&mut self, interleaved: &[f32]) -> ReelResult<()> {
        lock(&self.capture).audio.extend_from_slice(interleaved);
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        lock(&self.capture).audio_ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
