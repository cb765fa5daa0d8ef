use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Timeline of one render session: duration, frame count, and per-frame timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSchedule {
    fps: Fps,
    duration_secs: f64,
    total_frames: u64,
}

impl FrameSchedule {
    /// Session duration: the configured duration, stretched to the narration length when the
    /// narration is longer.
    pub fn session_duration_secs(configured_secs: f64, narration_secs: Option<f64>) -> f64 {
        configured_secs.max(narration_secs.unwrap_or(0.0))
    }

    /// Build a schedule covering `duration_secs` at `fps`.
    pub fn new(fps: Fps, duration_secs: f64) -> ReelResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ReelError::validation(format!(
                "session duration must be positive, got {duration_secs}"
            )));
        }
        let total_frames = fps.secs_to_frames_round(duration_secs);
        if total_frames == 0 {
            return Err(ReelError::validation(
                "session duration is shorter than one frame",
            ));
        }
        Ok(Self {
            fps,
            duration_secs,
            total_frames,
        })
    }

    /// Build the schedule for a request with `configured_secs` and an optional narration length.
    pub fn for_session(
        fps: Fps,
        configured_secs: u32,
        narration_secs: Option<f64>,
    ) -> ReelResult<Self> {
        Self::new(
            fps,
            Self::session_duration_secs(f64::from(configured_secs), narration_secs),
        )
    }

    /// Frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Session duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Number of frames to render, `round(duration * fps)`.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Normalized timeline position `f / total_frames`, in `[0, 1)` for valid frames.
    pub fn progress(&self, idx: FrameIndex) -> f64 {
        idx.0 as f64 / self.total_frames as f64
    }

    /// Presentation time of `idx`.
    pub fn timestamp_secs(&self, idx: FrameIndex) -> f64 {
        self.fps.frames_to_secs(idx.0)
    }

    /// `true` once `next` has reached the end of the timeline.
    pub fn is_complete(&self, next: FrameIndex) -> bool {
        next.0 >= self.total_frames
    }

    /// All frame indices in emission order.
    pub fn frames(&self) -> impl Iterator<Item = FrameIndex> + use<> {
        (0..self.total_frames).map(FrameIndex)
    }
}

/// How frame emission is paced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pacing {
    /// Emit as fast as the encoder accepts frames; the bounded channel provides backpressure.
    #[default]
    Backpressure,
    /// Emit on a monotonic tick every `1 / fps` seconds.
    Realtime,
}

/// Cooperative tick source shared by the frame loop and the audio mixer.
///
/// In [`Pacing::Backpressure`] mode `wait_for` only yields the thread. In [`Pacing::Realtime`]
/// mode it sleeps until `start + tick * interval`, where `start` is the instant of the first call.
#[derive(Debug)]
pub struct FrameClock {
    pacing: Pacing,
    interval: Duration,
    start: Option<Instant>,
}

impl FrameClock {
    /// Clock with an explicit tick interval.
    pub fn new(pacing: Pacing, interval: Duration) -> Self {
        Self {
            pacing,
            interval,
            start: None,
        }
    }

    /// Clock ticking once per frame at `fps`.
    pub fn for_fps(pacing: Pacing, fps: Fps) -> Self {
        Self::new(pacing, Duration::from_secs_f64(fps.frame_duration_secs()))
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block (or yield) until tick `tick` is due.
    pub fn wait_for(&mut self, tick: u64) {
        match self.pacing {
            Pacing::Backpressure => std::thread::yield_now(),
            Pacing::Realtime => {
                let start = *self.start.get_or_insert_with(Instant::now);
                let offset = self.interval.saturating_mul(u32::try_from(tick).unwrap_or(u32::MAX));
                let deadline = start + offset;
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                } else {
                    std::thread::yield_now();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/schedule.rs"]
mod tests;
