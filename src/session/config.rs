use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::animation::motion::{Effect, Transition};
use crate::assets::source::MediaSource;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::schedule::Pacing;

/// Shortest configurable video, in seconds.
pub const MIN_DURATION_SECS: u32 = 1;

/// Motion choices and output profile for one generation.
///
/// Missing JSON fields fall back to [`RenderConfig::default`]: zoom-in, fade-in, 10 s, 1280x720 at
/// 30 fps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Camera motion.
    pub effect: Effect,
    /// Intro transition.
    pub transition: Transition,
    /// Configured duration in whole seconds; narration may extend the session.
    pub duration: u32,
    /// Output frame size.
    pub frame_size: FrameSize,
    /// Output frame rate.
    pub fps: Fps,
    /// Frame emission pacing.
    pub pacing: Pacing,
    /// Bounded channel capacity between the renderer and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            effect: Effect::ZoomIn,
            transition: Transition::FadeIn,
            duration: 10,
            frame_size: FrameSize::default(),
            fps: Fps::default(),
            pacing: Pacing::default(),
            channel_capacity: 4,
        }
    }
}

impl RenderConfig {
    /// Check ranges that the renderer and encoder rely on.
    pub fn validate(&self) -> ReelResult<()> {
        if self.duration < MIN_DURATION_SECS {
            return Err(ReelError::validation(format!(
                "duration must be at least {MIN_DURATION_SECS} second, got {}",
                self.duration
            )));
        }
        let FrameSize { width, height } = self.frame_size;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("frame size must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "frame size must be even, got {width}x{height}"
            )));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ReelError::validation("frame size exceeds 65535"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.channel_capacity == 0 {
            return Err(ReelError::validation("channel capacity must be > 0"));
        }
        Ok(())
    }
}

/// A complete generation request: sources plus [`RenderConfig`].
///
/// JSON field names follow the camelCase wire form (`imageSource`, `voiceOverSource`,
/// `musicSource`, `effect`, `transition`, `duration`, ...). Empty audio locators mean "no track".
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    /// Still image (required).
    pub image_source: MediaSource,
    /// Narration audio.
    #[serde(
        default,
        deserialize_with = "empty_source_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub voice_over_source: Option<MediaSource>,
    /// Background music.
    #[serde(
        default,
        deserialize_with = "empty_source_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub music_source: Option<MediaSource>,
    /// Motion and output profile.
    #[serde(flatten)]
    pub config: RenderConfig,
}

impl VideoRequest {
    /// Request for `image_source` with default settings and no audio.
    pub fn new(image_source: MediaSource) -> Self {
        Self {
            image_source,
            voice_over_source: None,
            music_source: None,
            config: RenderConfig::default(),
        }
    }

    /// Set the narration source.
    pub fn with_voice_over(mut self, source: MediaSource) -> Self {
        self.voice_over_source = Some(source);
        self
    }

    /// Set the music source.
    pub fn with_music(mut self, source: MediaSource) -> Self {
        self.music_source = Some(source);
        self
    }

    /// Replace the render configuration.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Set effect and transition.
    pub fn with_motion(mut self, effect: Effect, transition: Transition) -> Self {
        self.config.effect = effect;
        self.config.transition = transition;
        self
    }

    /// Set the configured duration in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.config.duration = secs;
        self
    }

    /// Parse a request from JSON text.
    pub fn from_json(json: &str) -> ReelResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ReelError::serde(format!("parse video request JSON: {e}")))
    }

    /// Parse a request from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse video request JSON: {e}")))
    }

    /// Parse a request from a JSON file. Relative file locators resolve against the file's
    /// directory.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open video request '{}': {e}", path.display()))
        })?;
        let mut req = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            req.image_source = req.image_source.resolved_against(base);
            req.voice_over_source = req.voice_over_source.map(|s| s.resolved_against(base));
            req.music_source = req.music_source.map(|s| s.resolved_against(base));
        }
        Ok(req)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ReelResult<()> {
        self.config.validate()
    }
}

fn empty_source_as_none<'de, D>(d: D) -> Result<Option<MediaSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(MediaSource::parse))
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
