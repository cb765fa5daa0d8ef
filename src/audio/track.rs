use crate::assets::media::DecodedAudio;

/// Linear amplitude applied to narration.
pub const NARRATION_GAIN: f32 = 1.0;

/// Linear amplitude applied to background music.
pub const MUSIC_GAIN: f32 = 0.3;

/// Which slot a track occupies in the mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackRole {
    /// Voice-over: full gain, plays once from t=0.
    Narration,
    /// Background bed: attenuated, loops for the whole session.
    Music,
}

impl TrackRole {
    /// Fixed gain for this role.
    pub fn gain(self) -> f32 {
        match self {
            Self::Narration => NARRATION_GAIN,
            Self::Music => MUSIC_GAIN,
        }
    }

    /// Whether tracks in this role loop.
    pub fn looped(self) -> bool {
        matches!(self, Self::Music)
    }
}

/// Decoded audio bound to a mix role. Immutable once built.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    role: TrackRole,
    audio: DecodedAudio,
}

impl AudioTrack {
    /// Bind `audio` to `role`.
    pub fn new(role: TrackRole, audio: DecodedAudio) -> Self {
        Self { role, audio }
    }

    /// Narration track.
    pub fn narration(audio: DecodedAudio) -> Self {
        Self::new(TrackRole::Narration, audio)
    }

    /// Background music track.
    pub fn music(audio: DecodedAudio) -> Self {
        Self::new(TrackRole::Music, audio)
    }

    /// Mix role.
    pub fn role(&self) -> TrackRole {
        self.role
    }

    /// Linear gain, fixed by the role.
    pub fn gain(&self) -> f32 {
        self.role.gain()
    }

    /// Loop flag, fixed by the role.
    pub fn looped(&self) -> bool {
        self.role.looped()
    }

    /// Source duration in seconds (one pass, ignoring looping).
    pub fn duration_secs(&self) -> f64 {
        self.audio.duration_secs()
    }

    /// Decoded PCM.
    pub fn audio(&self) -> &DecodedAudio {
        &self.audio
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
