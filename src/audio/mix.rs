use crate::assets::media::MIX_SAMPLE_RATE;
use crate::audio::track::{AudioTrack, TrackRole};
use crate::encode::sink::{AudioSink, AudioStreamConfig};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::schedule::FrameClock;
use crate::session::cancel::CancelToken;

/// Sample frames produced per mixer step (100 ms at 48 kHz).
pub const MIX_CHUNK_FRAMES: usize = 4_800;

const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 192_000;

/// Output layout and length of a session mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MixSpec {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count (1 or 2).
    pub channels: u16,
    /// Output length in sample frames.
    pub total_frames: u64,
}

impl MixSpec {
    /// Stereo mix at [`MIX_SAMPLE_RATE`] covering `duration_secs`.
    pub fn for_duration(duration_secs: f64) -> Self {
        let total_frames = (duration_secs.max(0.0) * f64::from(MIX_SAMPLE_RATE)).round() as u64;
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            channels: 2,
            total_frames,
        }
    }

    /// Mix length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_frames as f64 / f64::from(self.sample_rate.max(1))
    }

    /// Stream layout advertised to the muxer.
    pub fn stream_config(&self) -> AudioStreamConfig {
        AudioStreamConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Session-scoped audio graph: one-shot narration plus looped, attenuated music summed into a
/// single stream.
///
/// The graph is built once per session and produces its output incrementally; `render_into`
/// drives it to completion against an [`AudioSink`].
#[derive(Debug)]
pub struct MixGraph {
    spec: MixSpec,
    tracks: Vec<AudioTrack>,
    cursor: u64,
}

impl MixGraph {
    /// Validate the sources and build the graph.
    ///
    /// Fails with [`ReelError::MixSetup`] for unsupported sample rates or channel layouts, or
    /// when a role is bound twice.
    #[tracing::instrument(skip_all, fields(tracks = tracks.len(), frames = spec.total_frames))]
    pub fn new(spec: MixSpec, tracks: Vec<AudioTrack>) -> ReelResult<Self> {
        check_rate("mix output", spec.sample_rate)?;
        if !(1..=2).contains(&spec.channels) {
            return Err(ReelError::mix_setup(format!(
                "mix output must be mono or stereo, got {} channels",
                spec.channels
            )));
        }

        for (i, track) in tracks.iter().enumerate() {
            let label = role_label(track.role());
            if tracks[..i].iter().any(|t| t.role() == track.role()) {
                return Err(ReelError::mix_setup(format!("{label} track bound twice")));
            }
            let audio = track.audio();
            check_rate(label, audio.sample_rate)?;
            if !(1..=2).contains(&audio.channels) {
                return Err(ReelError::mix_setup(format!(
                    "{label} must be mono or stereo, got {} channels",
                    audio.channels
                )));
            }
        }

        tracing::debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            "mix graph ready"
        );
        Ok(Self {
            spec,
            tracks,
            cursor: 0,
        })
    }

    /// Output layout.
    pub fn spec(&self) -> MixSpec {
        self.spec
    }

    /// Bound tracks.
    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    /// Sample frames already produced.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Sample frames still to produce.
    pub fn remaining(&self) -> u64 {
        self.spec.total_frames.saturating_sub(self.cursor)
    }

    /// Produce up to `max_frames` sample frames into `out` (cleared first) and advance.
    ///
    /// Returns the number of frames produced; `0` once the mix is complete.
    pub fn render_chunk(&mut self, out: &mut Vec<f32>, max_frames: usize) -> usize {
        let n = (max_frames as u64).min(self.remaining()) as usize;
        let channels = usize::from(self.spec.channels);
        out.clear();
        out.resize(n * channels, 0.0);

        for track in &self.tracks {
            mix_track(out, track, self.cursor, self.spec);
        }
        for s in out.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }

        self.cursor += n as u64;
        n
    }

    /// Drive the whole mix into `sink`, then end it.
    ///
    /// Checks `cancel` before every chunk and paces chunks on `clock`. Returns the number of
    /// sample frames written.
    pub fn render_into(
        &mut self,
        sink: &mut dyn AudioSink,
        cancel: &CancelToken,
        clock: &mut FrameClock,
    ) -> ReelResult<u64> {
        let mut buf = Vec::with_capacity(MIX_CHUNK_FRAMES * usize::from(self.spec.channels));
        let mut chunk = 0u64;
        while self.remaining() > 0 {
            cancel.check()?;
            clock.wait_for(chunk);
            let n = self.render_chunk(&mut buf, MIX_CHUNK_FRAMES);
            sink.write_samples(&buf)?;
            tracing::trace!(chunk, frames = n, "mixed audio chunk");
            chunk += 1;
        }
        sink.end()?;
        tracing::debug!(frames = self.cursor, "audio mix complete");
        Ok(self.cursor)
    }
}

impl Drop for MixGraph {
    fn drop(&mut self) {
        tracing::trace!(
            produced = self.cursor,
            total = self.spec.total_frames,
            "mix graph released"
        );
    }
}

fn check_rate(label: &str, rate: u32) -> ReelResult<()> {
    if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&rate) {
        Ok(())
    } else {
        Err(ReelError::mix_setup(format!(
            "{label} sample rate {rate} Hz is outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}"
        )))
    }
}

fn role_label(role: TrackRole) -> &'static str {
    match role {
        TrackRole::Narration => "narration",
        TrackRole::Music => "music",
    }
}

fn mix_track(out: &mut [f32], track: &AudioTrack, start_frame: u64, spec: MixSpec) {
    let audio = track.audio();
    let src = audio.interleaved_f32.as_ref();
    let src_channels = usize::from(audio.channels);
    let src_frames = audio.frames();
    if src_frames == 0 {
        return;
    }

    let ratio = f64::from(audio.sample_rate) / f64::from(spec.sample_rate);
    let gain = track.gain();
    let looped = track.looped();
    let out_channels = usize::from(spec.channels);

    for (i, dst) in out.chunks_exact_mut(out_channels).enumerate() {
        let mut src_pos = (start_frame + i as u64) as f64 * ratio;
        if looped {
            src_pos = src_pos.rem_euclid(src_frames as f64);
        }
        let frame0 = src_pos.floor() as usize;
        if frame0 >= src_frames {
            // One-shot source exhausted; later frames are past it too.
            break;
        }
        let frame1 = if frame0 + 1 < src_frames {
            frame0 + 1
        } else if looped {
            0
        } else {
            frame0
        };
        let frac = (src_pos - frame0 as f64) as f32;

        let (l, r) = if src_channels == 1 {
            let v0 = src[frame0];
            let v1 = src[frame1];
            let v = v0 + (v1 - v0) * frac;
            (v, v)
        } else {
            let i0 = frame0 * src_channels;
            let i1 = frame1 * src_channels;
            (
                src[i0] + (src[i1] - src[i0]) * frac,
                src[i0 + 1] + (src[i1 + 1] - src[i0 + 1]) * frac,
            )
        };

        if out_channels == 1 {
            dst[0] += 0.5 * (l + r) * gain;
        } else {
            dst[0] += l * gain;
            dst[1] += r * gain;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
