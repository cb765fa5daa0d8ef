use std::sync::mpsc;
use std::time::Duration;

use crate::assets::loader::{AssetLoader, LoadedAssets};
use crate::audio::mix::{MIX_CHUNK_FRAMES, MixGraph, MixSpec};
use crate::audio::track::AudioTrack;
use crate::encode::ffmpeg::FfmpegMuxer;
use crate::encode::sink::{AudioSink, FrameSink, MuxConfig, MuxInputs, Muxer, OutputArtifact};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::cpu::FrameRenderer;
use crate::render::frame::Frame;
use crate::render::schedule::{FrameClock, FrameSchedule, Pacing};
use crate::session::cancel::CancelToken;
use crate::session::config::VideoRequest;
use crate::session::progress::{self, ProgressReporter};

/// Counters describing a finished session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames in the timeline.
    pub frames_total: u64,
    /// Frames rendered and handed to the encoder.
    pub frames_rendered: u64,
    /// Session duration in seconds.
    pub duration_secs: f64,
    /// Audio sample frames mixed (0 when the session has no narration or music).
    pub audio_frames_mixed: u64,
}

/// Result of a successful session.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// The encoded artifact.
    pub artifact: OutputArtifact,
    /// Session counters.
    pub stats: RenderStats,
}

/// One in-flight generation: load, mix and render concurrently, mux, and return the artifact.
///
/// A session runs once. Mixer and encoder resources live only inside [`RenderSession::run`] and
/// are released on every exit path; on failure or cancellation the muxer is aborted and no
/// artifact is produced.
pub struct RenderSession<'m> {
    request: VideoRequest,
    loader: AssetLoader,
    muxer: Box<dyn Muxer + 'm>,
    cancel: CancelToken,
}

impl std::fmt::Debug for RenderSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("request", &self.request)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<'m> RenderSession<'m> {
    /// Validate `request` and bind it to `muxer`.
    pub fn new(request: VideoRequest, muxer: Box<dyn Muxer + 'm>) -> ReelResult<Self> {
        request.validate()?;
        Ok(Self {
            request,
            loader: AssetLoader::default(),
            muxer,
            cancel: CancelToken::new(),
        })
    }

    /// Use a loader with custom decoders.
    pub fn with_loader(mut self, loader: AssetLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Observe `token` for cancellation.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts this session when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the session to completion, reporting progress through `on_progress`.
    #[tracing::instrument(skip_all, fields(
        effect = %self.request.config.effect,
        transition = %self.request.config.transition,
        duration = self.request.config.duration,
    ))]
    pub fn run(mut self, on_progress: impl FnMut(f64)) -> ReelResult<RenderOutput> {
        let mut reporter = ProgressReporter::new(on_progress);

        reporter.report(progress::LOAD_STARTED);
        let assets = self.loader.load(
            &self.request.image_source,
            self.request.voice_over_source.as_ref(),
            self.request.music_source.as_ref(),
        )?;
        self.cancel.check()?;
        reporter.report(progress::ASSETS_LOADED);

        let cfg = &self.request.config;
        let narration_secs = assets.narration.as_ref().map(|a| a.duration_secs());
        let schedule = FrameSchedule::for_session(cfg.fps, cfg.duration, narration_secs)?;
        tracing::info!(
            duration_secs = schedule.duration_secs(),
            total_frames = schedule.total_frames(),
            narration = assets.narration.is_some(),
            music = assets.music.is_some(),
            "session timeline"
        );

        let mix = build_mix(&assets, &schedule)?;
        let renderer =
            FrameRenderer::new(&assets.image, cfg.frame_size, cfg.effect, cfg.transition)?;
        drop(assets);

        let mux_cfg = MuxConfig {
            size: cfg.frame_size,
            fps: cfg.fps,
            total_frames: schedule.total_frames(),
            audio: mix.as_ref().map(|m| m.spec().stream_config()),
        };
        let inputs = self.muxer.open(&mux_cfg)?;
        if let Err(e) = self.cancel.check() {
            self.muxer.abort();
            return Err(e);
        }
        reporter.report(progress::STREAMS_READY);

        let streamed = stream(
            StreamCtx {
                schedule: &schedule,
                mux_cfg: &mux_cfg,
                pacing: cfg.pacing,
                channel_capacity: cfg.channel_capacity,
                cancel: &self.cancel,
            },
            renderer,
            mix,
            inputs,
            &mut reporter,
        );
        let stats = match streamed {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "session aborted");
                self.muxer.abort();
                return Err(e);
            }
        };

        let artifact = match self.muxer.finalize() {
            Ok(artifact) => artifact,
            Err(e) => {
                self.muxer.abort();
                return Err(e);
            }
        };
        reporter.report(progress::COMPLETE);
        tracing::info!(
            bytes = artifact.bytes.len(),
            mime = %artifact.mime,
            frames = stats.frames_rendered,
            "session complete"
        );
        Ok(RenderOutput { artifact, stats })
    }
}

/// Generate an MP4 for `request` with the system `ffmpeg`.
pub fn generate_video(
    request: &VideoRequest,
    on_progress: impl FnMut(f64),
) -> ReelResult<RenderOutput> {
    RenderSession::new(request.clone(), Box::new(FfmpegMuxer::new()))?.run(on_progress)
}

fn build_mix(assets: &LoadedAssets, schedule: &FrameSchedule) -> ReelResult<Option<MixGraph>> {
    let mut tracks = Vec::with_capacity(2);
    if let Some(narration) = &assets.narration {
        tracks.push(AudioTrack::narration(narration.clone()));
    }
    if let Some(music) = &assets.music {
        tracks.push(AudioTrack::music(music.clone()));
    }
    if tracks.is_empty() {
        return Ok(None);
    }
    MixGraph::new(MixSpec::for_duration(schedule.duration_secs()), tracks).map(Some)
}

struct StreamCtx<'a> {
    schedule: &'a FrameSchedule,
    mux_cfg: &'a MuxConfig,
    pacing: Pacing,
    channel_capacity: usize,
    cancel: &'a CancelToken,
}

/// Render frames on the calling thread while an encoder thread feeds the frame sink and a mixer
/// thread feeds the audio sink.
fn stream(
    ctx: StreamCtx<'_>,
    mut renderer: FrameRenderer,
    mix: Option<MixGraph>,
    inputs: MuxInputs,
    reporter: &mut ProgressReporter<'_>,
) -> ReelResult<RenderStats> {
    let MuxInputs { mut video, audio } = inputs;
    let audio_job = match (mix, audio) {
        (Some(graph), Some(sink)) => Some((graph, sink)),
        (None, None) => None,
        _ => {
            return Err(ReelError::mix_setup(
                "muxer audio input does not match the mix graph",
            ));
        }
    };
    let total = ctx.schedule.total_frames();
    // Cancelled by the caller's token or by any failing stage.
    let halt = ctx.cancel.child();

    // The frame input is accepting before the first frame is rendered.
    video.begin(ctx.mux_cfg)?;

    std::thread::scope(|scope| -> ReelResult<RenderStats> {
        let (tx, rx) = mpsc::sync_channel::<Frame>(ctx.channel_capacity.max(1));

        let enc_halt = halt.clone();
        let enc = scope.spawn(move || -> ReelResult<u64> {
            let res = encode_frames(video.as_mut(), &rx, total);
            if res.is_err() {
                enc_halt.cancel();
            }
            res
        });

        let mix_job = audio_job.map(|(graph, sink)| {
            let mix_halt = halt.clone();
            let pacing = ctx.pacing;
            scope.spawn(move || mix_audio(graph, sink, &mix_halt, pacing))
        });

        let mut stats = RenderStats {
            frames_total: total,
            duration_secs: ctx.schedule.duration_secs(),
            ..RenderStats::default()
        };
        let mut clock = FrameClock::for_fps(ctx.pacing, ctx.schedule.fps());
        let produce_res = (|| -> ReelResult<()> {
            for idx in ctx.schedule.frames() {
                ctx.cancel.check()?;
                if halt.is_cancelled() {
                    return Err(ReelError::encode("encoding stopped before the last frame"));
                }
                clock.wait_for(idx.0);
                let frame = renderer.render(ctx.schedule, idx)?;
                tx.send(frame)
                    .map_err(|_| ReelError::encode("encoder thread is not accepting frames"))?;
                stats.frames_rendered += 1;
                reporter.report(progress::render_percent(idx.0 + 1, total));
            }
            Ok(())
        })();
        if produce_res.is_err() {
            halt.cancel();
        }

        drop(tx);
        let enc_res = enc
            .join()
            .map_err(|_| ReelError::encode("encoder thread panicked"))?;
        let mix_res = match mix_job {
            Some(job) => job
                .join()
                .map_err(|_| ReelError::mix_setup("mixer thread panicked"))?,
            None => Ok(0),
        };

        // A stage failure outranks the secondary errors it caused in the other stages.
        enc_res?;
        match mix_res {
            Err(ReelError::Cancelled) => {
                produce_res?;
                Err(ReelError::Cancelled)
            }
            Err(e) => Err(e),
            Ok(mixed) => {
                produce_res?;
                stats.audio_frames_mixed = mixed;
                tracing::debug!(frames = stats.frames_rendered, "frame stream complete");
                Ok(stats)
            }
        }
    })
}

/// Drain exactly `total` frames into `sink`, then end it.
///
/// Returns early without error if the producer hangs up first; the producer reports why.
fn encode_frames(
    sink: &mut dyn FrameSink,
    rx: &mpsc::Receiver<Frame>,
    total: u64,
) -> ReelResult<u64> {
    let mut pushed = 0u64;
    while pushed < total {
        let Ok(frame) = rx.recv() else {
            return Ok(pushed);
        };
        sink.push_frame(&frame)?;
        pushed += 1;
    }
    sink.end()?;
    Ok(pushed)
}

fn mix_audio(
    mut graph: MixGraph,
    mut sink: Box<dyn AudioSink>,
    halt: &CancelToken,
    pacing: Pacing,
) -> ReelResult<u64> {
    let chunk_secs = MIX_CHUNK_FRAMES as f64 / f64::from(graph.spec().sample_rate);
    let mut clock = FrameClock::new(pacing, Duration::from_secs_f64(chunk_secs));
    let res = graph.render_into(sink.as_mut(), halt, &mut clock);
    if res.is_err() {
        halt.cancel();
    }
    res
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
