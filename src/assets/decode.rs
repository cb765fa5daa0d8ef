use std::{io::Cursor, sync::Arc};

use crate::{
    assets::media::{self, DecodedAudio, MIX_SAMPLE_RATE, MediaAsset},
    foundation::error::{ReelError, ReelResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decodes encoded still-image bytes into a [`MediaAsset`].
pub trait ImageDecoder: Send + Sync {
    /// Decode `bytes`; undecodable input fails with [`ReelError::AssetLoad`].
    fn decode_image(&self, bytes: &[u8]) -> ReelResult<MediaAsset>;
}

/// Decodes encoded audio bytes into interleaved `f32` PCM.
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes`; undecodable input fails with [`ReelError::AssetLoad`].
    fn decode_audio(&self, bytes: &[u8]) -> ReelResult<DecodedAudio>;
}

/// [`ImageDecoder`] backed by the `image` crate (PNG, JPEG, WebP, GIF, ...).
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterImageDecoder;

impl ImageDecoder for RasterImageDecoder {
    fn decode_image(&self, bytes: &[u8]) -> ReelResult<MediaAsset> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| ReelError::asset_load(format!("decode image from memory: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(ReelError::asset_load("decoded image has zero size"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ReelError::asset_load(format!(
                "image {width}x{height} exceeds the 65535px raster limit"
            )));
        }

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);

        Ok(MediaAsset {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

/// In-process RIFF/WAVE decoder (PCM int 8-32 bit and float 32 bit).
#[derive(Clone, Copy, Debug, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode_audio(&self, bytes: &[u8]) -> ReelResult<DecodedAudio> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| ReelError::asset_load(format!("invalid wav data: {e}")))?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ReelError::asset_load(format!("wav sample read failed: {e}")))?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(ReelError::asset_load(format!(
                        "unsupported wav bit depth {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ReelError::asset_load(format!("wav sample read failed: {e}")))?
            }
        };

        Ok(DecodedAudio {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            interleaved_f32: Arc::new(samples),
        })
    }
}

/// [`AudioDecoder`] that pipes bytes through the system `ffmpeg` (MP3, AAC, OGG, ...).
///
/// Output is always stereo at `sample_rate`.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegAudioDecoder {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for FfmpegAudioDecoder {
    fn default() -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
        }
    }
}

impl AudioDecoder for FfmpegAudioDecoder {
    fn decode_audio(&self, bytes: &[u8]) -> ReelResult<DecodedAudio> {
        media::decode_audio_f32_stereo(bytes, self.sample_rate)
    }
}

/// Sniffs the container: WAV is decoded in-process, everything else goes to `ffmpeg`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoAudioDecoder {
    wav: WavDecoder,
    ffmpeg: FfmpegAudioDecoder,
}

impl AudioDecoder for AutoAudioDecoder {
    fn decode_audio(&self, bytes: &[u8]) -> ReelResult<DecodedAudio> {
        if is_riff_wave(bytes) {
            self.wav.decode_audio(bytes)
        } else {
            self.ffmpeg.decode_audio(bytes)
        }
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
