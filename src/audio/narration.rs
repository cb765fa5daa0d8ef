use std::io::Cursor;

use anyhow::Context as _;

use crate::assets::source::MediaSource;
use crate::foundation::error::{ReelError, ReelResult};

/// Speaking rate assumed by the placeholder, in words per minute.
pub const WORDS_PER_MINUTE: f64 = 180.0;

/// Sample rate of placeholder narration WAVs.
pub const PLACEHOLDER_SAMPLE_RATE: u32 = 24_000;

/// Estimated read-aloud time for `text`: `max(1, words / 180 * 60)` seconds.
pub fn estimate_duration_secs(text: &str) -> f64 {
    let words = text.split_whitespace().count() as f64;
    (words * 60.0 / WORDS_PER_MINUTE).max(1.0)
}

/// A generated stand-in for real text-to-speech output.
#[derive(Clone, Debug)]
pub struct PlaceholderNarration {
    /// Whitespace-separated word count of the source text.
    pub word_count: usize,
    /// Length of the audio in seconds.
    pub duration_secs: f64,
    /// Complete RIFF/WAVE file: mono, 16-bit PCM, 24 kHz, silent.
    pub wav: Vec<u8>,
}

impl PlaceholderNarration {
    /// Locator usable as a voice-over source.
    pub fn source(&self) -> MediaSource {
        MediaSource::bytes(self.wav.clone())
    }
}

/// Produce a silent narration WAV whose length approximates reading `text` aloud.
#[tracing::instrument(skip(text), fields(chars = text.len()))]
pub fn placeholder(text: &str) -> ReelResult<PlaceholderNarration> {
    let word_count = text.split_whitespace().count();
    if word_count == 0 {
        return Err(ReelError::validation("narration text must not be empty"));
    }
    let duration_secs = estimate_duration_secs(text);
    let samples = (duration_secs * f64::from(PLACEHOLDER_SAMPLE_RATE)).round() as u64;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: PLACEHOLDER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut wav), spec)
            .context("failed to start placeholder wav")?;
        for _ in 0..samples {
            writer
                .write_sample(0i16)
                .context("failed to write placeholder wav sample")?;
        }
        writer
            .finalize()
            .context("failed to finalize placeholder wav")?;
    }

    tracing::debug!(word_count, duration_secs, "generated placeholder narration");
    Ok(PlaceholderNarration {
        word_count,
        duration_secs,
        wav,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/narration.rs"]
mod tests;
