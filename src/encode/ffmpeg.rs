use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::assets::media::MIX_SAMPLE_RATE;
use crate::encode::sink::{
    AudioSink, AudioStreamConfig, FrameSink, MuxConfig, MuxInputs, Muxer, OutputArtifact,
};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::frame::Frame;

/// Environment variable overriding the `ffmpeg` executable.
pub const FFMPEG_ENV: &str = "STILLREEL_FFMPEG";

/// Container type produced by [`FfmpegMuxer`].
pub const MP4_MIME: &str = "video/mp4";

/// Encoders every artifact needs: H.264 video plus an AAC track (silent when there is no mix).
const REQUIRED_ENCODERS: [&str; 2] = ["libx264", "aac"];

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// `ffmpeg` executable to invoke: `$STILLREEL_FFMPEG` when set, otherwise `ffmpeg` from `PATH`.
pub(crate) fn ffmpeg_program() -> OsString {
    std::env::var_os(FFMPEG_ENV)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| OsString::from("ffmpeg"))
}

/// Return `true` when `ffmpeg` can be invoked.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new(ffmpeg_program())
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Names from `required` that do not appear in an `ffmpeg -encoders` listing.
///
/// Listing rows look like ` V....D libx264   libx264 H.264 ...`: a six-character capability
/// column followed by the encoder name.
pub(crate) fn missing_encoders<'a>(listing: &str, required: &[&'a str]) -> Vec<&'a str> {
    let available: Vec<&str> = listing
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let flags = cols.next()?;
            let name = cols.next()?;
            let is_row = flags.len() == 6
                && flags
                    .chars()
                    .all(|c| c == '.' || c.is_ascii_uppercase());
            is_row.then_some(name)
        })
        .collect();
    required
        .iter()
        .copied()
        .filter(|name| !available.contains(name))
        .collect()
}

fn list_encoders() -> ReelResult<String> {
    let output = Command::new(ffmpeg_program())
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ReelError::encoder_unavailable(format!("failed to run ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(ReelError::encoder_unavailable(format!(
            "ffmpeg -encoders exited with status {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// MP4 muxer (H.264 video, AAC audio) backed by the system `ffmpeg`.
///
/// Frames stream into an `ffmpeg` process as raw RGBA on stdin while the mixed audio is spooled
/// to a raw `f32le` file. `finalize` muxes both into one MP4 and returns its bytes; without a mix
/// the MP4 gets a silent AAC track. `open` fails with [`ReelError::EncoderUnavailable`] when the
/// host `ffmpeg` lacks `libx264` or `aac`. Every intermediate file is removed when the muxer is
/// finalized, aborted, or dropped.
#[derive(Debug)]
pub struct FfmpegMuxer {
    work_dir: PathBuf,
    cfg: Option<MuxConfig>,
    video_tmp: TempFileGuard,
    audio_tmp: TempFileGuard,
    finalized: bool,
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegMuxer {
    /// Muxer using the system temp directory for intermediates.
    pub fn new() -> Self {
        Self::with_work_dir(std::env::temp_dir())
    }

    /// Muxer placing intermediates in `dir`.
    pub fn with_work_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: dir.into(),
            cfg: None,
            video_tmp: TempFileGuard(None),
            audio_tmp: TempFileGuard(None),
            finalized: false,
        }
    }

    fn temp_path(&self, suffix: &str) -> PathBuf {
        self.work_dir.join(format!(
            "stillreel_{}_{}_{}",
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed),
            suffix
        ))
    }
}

impl Muxer for FfmpegMuxer {
    #[tracing::instrument(skip_all, fields(w = cfg.size.width, h = cfg.size.height, audio = cfg.audio.is_some()))]
    fn open(&mut self, cfg: &MuxConfig) -> ReelResult<MuxInputs> {
        if self.cfg.is_some() {
            return Err(ReelError::encode("ffmpeg muxer is already open"));
        }
        if cfg.size.width == 0 || cfg.size.height == 0 {
            return Err(ReelError::validation("mp4 width/height must be non-zero"));
        }
        if !cfg.size.width.is_multiple_of(2) || !cfg.size.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "mp4 width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::encoder_unavailable(format!(
                "ffmpeg is required for MP4 encoding, but '{}' could not be run",
                ffmpeg_program().to_string_lossy()
            )));
        }
        let missing = missing_encoders(&list_encoders()?, &REQUIRED_ENCODERS);
        if !missing.is_empty() {
            return Err(ReelError::encoder_unavailable(format!(
                "ffmpeg '{}' lacks the encoder(s) needed for MP4 output: {}",
                ffmpeg_program().to_string_lossy(),
                missing.join(", ")
            )));
        }
        std::fs::create_dir_all(&self.work_dir).with_context(|| {
            format!("failed to create work directory '{}'", self.work_dir.display())
        })?;

        let video_path = self.temp_path("video.mp4");
        self.video_tmp = TempFileGuard(Some(video_path.clone()));
        let video = Box::new(FfmpegVideoSink::new(video_path));

        let audio = match cfg.audio {
            Some(stream) => {
                if stream.sample_rate == 0 || stream.channels == 0 {
                    return Err(ReelError::validation(
                        "audio sample_rate/channels must be non-zero",
                    ));
                }
                let path = self.temp_path("audio.f32le");
                let file = File::create(&path).with_context(|| {
                    format!("failed to create audio spool '{}'", path.display())
                })?;
                self.audio_tmp = TempFileGuard(Some(path));
                Some(Box::new(SpoolAudioSink {
                    writer: Some(BufWriter::new(file)),
                }) as Box<dyn AudioSink>)
            }
            None => None,
        };

        tracing::debug!("ffmpeg muxer opened");
        self.cfg = Some(cfg.clone());
        self.finalized = false;
        Ok(MuxInputs { video, audio })
    }

    #[tracing::instrument(skip_all)]
    fn finalize(&mut self) -> ReelResult<OutputArtifact> {
        if self.finalized {
            return Err(ReelError::encode("artifact was already produced"));
        }
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg muxer was never opened"))?;
        let video_path = self
            .video_tmp
            .path()
            .ok_or_else(|| ReelError::encode("video intermediate is missing"))?
            .to_path_buf();

        let audio = match (cfg.audio, self.audio_tmp.path()) {
            (Some(stream), Some(path)) => AudioInput::Spool { path, stream },
            (Some(_), None) => return Err(ReelError::encode("audio intermediate is missing")),
            (None, _) => AudioInput::Silence,
        };
        let out_path = self.temp_path("muxed.mp4");
        let _out = TempFileGuard(Some(out_path.clone()));
        let mut cmd = Command::new(ffmpeg_program());
        cmd.args(mux_args(&video_path, &audio, &out_path));
        run_to_completion(cmd, "mux")?;
        let bytes = read_artifact(&out_path)?;

        self.video_tmp = TempFileGuard(None);
        self.audio_tmp = TempFileGuard(None);
        self.finalized = true;
        tracing::info!(bytes = bytes.len(), "mp4 finalized");
        Ok(OutputArtifact {
            bytes,
            mime: MP4_MIME.to_owned(),
        })
    }

    fn abort(&mut self) {
        tracing::debug!("ffmpeg muxer aborted");
        self.cfg = None;
        self.video_tmp = TempFileGuard(None);
        self.audio_tmp = TempFileGuard(None);
    }
}

/// Audio side of the final mux pass.
#[derive(Debug)]
enum AudioInput<'a> {
    /// Spooled interleaved `f32le` samples.
    Spool {
        path: &'a Path,
        stream: AudioStreamConfig,
    },
    /// No mix: a generated silent stereo track at [`MIX_SAMPLE_RATE`].
    Silence,
}

/// Arguments muxing the encoded video with one AAC track into `out`.
fn mux_args(video: &Path, audio: &AudioInput<'_>, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(video.into());
    match audio {
        AudioInput::Spool { path, stream } => {
            args.extend(
                [
                    "-f".to_owned(),
                    "f32le".to_owned(),
                    "-ar".to_owned(),
                    stream.sample_rate.to_string(),
                    "-ac".to_owned(),
                    stream.channels.to_string(),
                    "-i".to_owned(),
                ]
                .map(OsString::from),
            );
            args.push((*path).into());
        }
        AudioInput::Silence => {
            args.extend(
                [
                    "-f".to_owned(),
                    "lavfi".to_owned(),
                    "-i".to_owned(),
                    format!("anullsrc=r={MIX_SAMPLE_RATE}:cl=stereo"),
                ]
                .map(OsString::from),
            );
        }
    }
    args.extend(
        [
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-shortest",
            "-movflags",
            "+faststart",
        ]
        .map(OsString::from),
    );
    args.push(out.into());
    args
}

fn read_artifact(path: &Path) -> ReelResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ReelError::encode(format!("failed to read '{}': {e}", path.display())))
}

fn run_to_completion(mut cmd: Command, stage: &str) -> ReelResult<()> {
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ReelError::encoder_unavailable(format!("failed to spawn ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(ReelError::encode(format!(
            "ffmpeg {stage} exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Frame input that streams flattened RGBA8 into an `ffmpeg` H.264 encode.
struct FfmpegVideoSink {
    out_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    frame_len: usize,
    last_idx: Option<FrameIndex>,
}

impl FfmpegVideoSink {
    fn new(out_path: PathBuf) -> Self {
        Self {
            out_path,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            frame_len: 0,
            last_idx: None,
        }
    }

    fn collect_stderr(&mut self) -> String {
        match self.stderr_drain.take().map(|h| h.join()) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            _ => String::new(),
        }
    }
}

impl FrameSink for FfmpegVideoSink {
    fn begin(&mut self, cfg: &MuxConfig) -> ReelResult<()> {
        let mut cmd = Command::new(ffmpeg_program());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames on stdin; alpha is flattened before writing.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.size.width, cfg.size.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&self.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| ReelError::encoder_unavailable(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.frame_len = cfg.size.rgba_len();
        self.scratch = vec![0u8; self.frame_len];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()> {
        if let Some(last) = self.last_idx
            && frame.index <= last
        {
            return Err(ReelError::encode("ffmpeg sink received out-of-order frame"));
        }
        self.last_idx = Some(frame.index);
        if frame.data.len() != self.frame_len {
            return Err(ReelError::encode(format!(
                "frame {} has {} bytes, expected {}",
                frame.index.0,
                frame.data.len(),
                self.frame_len
            )));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, [0, 0, 0])?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is not running"));
        };
        if let Err(e) = stdin.write_all(&self.scratch) {
            drop(self.stdin.take());
            let stderr = self.collect_stderr();
            return Err(ReelError::encode(format!(
                "failed to write frame {} to ffmpeg: {e} {stderr}",
                frame.index.0
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.collect_stderr();
        if !status.success() {
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegVideoSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Audio input that spools interleaved samples to a raw `f32le` file.
struct SpoolAudioSink {
    writer: Option<BufWriter<File>>,
}

impl AudioSink for SpoolAudioSink {
    fn write_samples(&mut self, interleaved: &[f32]) -> ReelResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ReelError::encode("audio spool already closed"))?;
        for sample in interleaved {
            writer
                .write_all(&sample.to_le_bytes())
                .map_err(|e| ReelError::encode(format!("failed to spool audio: {e}")))?;
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ReelError::encode(format!("failed to flush audio spool: {e}")))?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
