use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

/// Sample rate of the mixed session audio stream.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded still image in premultiplied RGBA8 form. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct MediaAsset {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl MediaAsset {
    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// Decoded audio as interleaved `f32` PCM at its native sample rate.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved PCM samples.
    pub interleaved_f32: Arc<Vec<f32>>,
}

impl DecodedAudio {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }

    /// Return `true` when there are no sample frames.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

/// Decode arbitrary encoded audio to interleaved stereo `f32` through the system `ffmpeg`.
#[cfg(feature = "media-ffmpeg")]
pub(crate) fn decode_audio_f32_stereo(bytes: &[u8], sample_rate: u32) -> ReelResult<DecodedAudio> {
    use std::io::Write as _;
    use std::process::{Command, Stdio};

    let mut child = Command::new(crate::encode::ffmpeg::ffmpeg_program())
        .args(["-v", "error", "-i", "pipe:0"])
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ReelError::asset_load(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| ReelError::asset_load("failed to open ffmpeg stdin (unexpected)"))?;
    let input = bytes.to_vec();
    // ffmpeg may stop reading early on bad input; the exit status carries that error.
    let feeder = std::thread::spawn(move || {
        let _ = stdin.write_all(&input);
    });

    let out = child
        .wait_with_output()
        .map_err(|e| ReelError::asset_load(format!("failed to wait for ffmpeg audio decode: {e}")))?;
    let _ = feeder.join();

    if !out.status.success() {
        return Err(ReelError::asset_load(format!(
            "ffmpeg audio decode failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::asset_load(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(DecodedAudio {
        sample_rate,
        channels: 2,
        interleaved_f32: Arc::new(pcm),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub(crate) fn decode_audio_f32_stereo(
    _bytes: &[u8],
    _sample_rate: u32,
) -> ReelResult<DecodedAudio> {
    Err(ReelError::asset_load(
        "non-WAV audio requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
