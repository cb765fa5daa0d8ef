use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use stillreel::{
    AssetLoader, Effect, FrameIndex, FrameRenderer, FrameSchedule, FrameSize, MediaSource, Pacing,
    RenderConfig, Transition, VideoRequest,
};

#[derive(Parser, Debug)]
#[command(name = "stillreel", version, about = "Turn a still image into a short video")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render a single frame of the animation as a PNG.
    Frame(FrameArgs),
    /// Write a silent placeholder narration WAV sized to the text.
    Narrate(NarrateArgs),
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Request JSON; flags below override its fields.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Still image locator (path or data URI).
    #[arg(long)]
    image: Option<String>,

    /// Narration audio locator.
    #[arg(long)]
    voice_over: Option<String>,

    /// Background music locator; an empty string disables music.
    #[arg(long)]
    music: Option<String>,

    /// Camera effect: none, zoom-in, zoom-out, pan-left, pan-right.
    #[arg(long)]
    effect: Option<Effect>,

    /// Intro transition: none, fade-in, slide-in-left.
    #[arg(long)]
    transition: Option<Transition>,

    /// Duration in seconds (at least 1).
    #[arg(long)]
    duration: Option<u32>,

    /// Output size as WIDTHxHEIGHT (defaults to 1280x720).
    #[arg(long, value_parser = parse_size)]
    size: Option<FrameSize>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Emit frames on a wall-clock timer instead of as fast as the encoder accepts them.
    #[arg(long)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct NarrateArgs {
    /// Text to narrate.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Output WAV path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Narrate(args) => cmd_narrate(args),
    }
}

fn parse_size(raw: &str) -> Result<FrameSize, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width = w.trim().parse::<u32>().map_err(|e| format!("bad width: {e}"))?;
    let height = h.trim().parse::<u32>().map_err(|e| format!("bad height: {e}"))?;
    Ok(FrameSize::new(width, height))
}

fn build_request(args: RequestArgs) -> anyhow::Result<VideoRequest> {
    let image = match args.image.as_deref() {
        Some(raw) => Some(MediaSource::parse(raw).context("--image must not be empty")?),
        None => None,
    };
    let mut req = match (&args.in_path, image) {
        (Some(path), image) => {
            let mut req = VideoRequest::from_path(path)?;
            if let Some(image) = image {
                req.image_source = image;
            }
            req
        }
        (None, Some(image)) => VideoRequest::new(image),
        (None, None) => anyhow::bail!("either --in or --image is required"),
    };
    if let Some(voice) = args.voice_over.as_deref() {
        req.voice_over_source = MediaSource::parse(voice);
    }
    if let Some(music) = args.music.as_deref() {
        req.music_source = MediaSource::parse(music);
    }
    let cfg: &mut RenderConfig = &mut req.config;
    if let Some(effect) = args.effect {
        cfg.effect = effect;
    }
    if let Some(transition) = args.transition {
        cfg.transition = transition;
    }
    if let Some(duration) = args.duration {
        cfg.duration = duration;
    }
    if let Some(size) = args.size {
        cfg.frame_size = size;
    }
    req.validate()?;
    Ok(req)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut req = build_request(args.request)?;
    if args.realtime {
        req.config.pacing = Pacing::Realtime;
    }

    let mut last_printed = -1i64;
    let output = stillreel::generate_video(&req, |p| {
        let pct = p.floor() as i64;
        if pct != last_printed {
            last_printed = pct;
            eprint!("\rprogress: {pct:>3}%");
            let _ = std::io::stderr().flush();
        }
    })?;
    eprintln!();

    stillreel::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &output.artifact.bytes)
        .with_context(|| format!("write video '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} frames, {:.2}s, {})",
        args.out.display(),
        output.stats.frames_rendered,
        output.stats.duration_secs,
        output.artifact.mime
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let req = build_request(args.request)?;
    let cfg = &req.config;

    let assets = AssetLoader::default().load(
        &req.image_source,
        req.voice_over_source.as_ref(),
        None,
    )?;
    let narration_secs = assets.narration.as_ref().map(|a| a.duration_secs());
    let schedule = FrameSchedule::for_session(cfg.fps, cfg.duration, narration_secs)?;
    let mut renderer =
        FrameRenderer::new(&assets.image, cfg.frame_size, cfg.effect, cfg.transition)?;
    let frame = renderer.render(&schedule, FrameIndex(args.frame))?;

    stillreel::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} (frame {} of {}, t={:.3}s)",
        args.out.display(),
        args.frame,
        schedule.total_frames(),
        frame.timestamp_secs
    );
    Ok(())
}

fn cmd_narrate(args: NarrateArgs) -> anyhow::Result<()> {
    let text = match (args.text, args.text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("read text '{}'", path.display()))?,
        (None, None) => anyhow::bail!("either --text or --text-file is required"),
    };
    let clip = stillreel::placeholder(&text)?;

    stillreel::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &clip.wav)
        .with_context(|| format!("write wav '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} words, {:.2}s)",
        args.out.display(),
        clip.word_count,
        clip.duration_secs
    );
    Ok(())
}
