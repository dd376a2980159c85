use std::io::Stdout;
use std::net::SocketAddr;
use std::num::{NonZeroU32, NonZeroU64};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flipdotflut_core::receiver::{DEFAULT_BIND, DotBoard, Received, Receiver};
use flipdotflut_core::render::TerminalRenderer;
use flipdotflut_core::source::{
    AnimatedGradient, MotionProfile, PatternKind, ProceduralPattern, Source, SourceError,
    StaticGradient, StaticImage, VideoFrames,
};
use flipdotflut_core::stream::{Iterations, StreamConfig, Streamer};
use flipdotflut_core::transform::{Binarization, DEFAULT_THRESHOLD, ScaleMode, TransformConfig};
use flipdotflut_core::transport::{DEFAULT_HOST, DEFAULT_PORT, UdpSink, resolve_destination};
use flipdotflut_core::{HEIGHT, SessionSummary, WIDTH};
use glob::glob;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("FLIPDOTFLUT_BUILD_COMMIT"),
    ", built ",
    env!("FLIPDOTFLUT_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  flipdotflut gradient --animate orbit\n  flipdotflut image logo.png --scale fit --host 10.0.0.5\n  flipdotflut pattern columns --debug\n  flipdotflut video clip.mp4 --no-delay\n  flipdotflut listen --bind 0.0.0.0:1337 --debug";

#[derive(Parser, Debug)]
#[command(name = "flipdotflut")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Stream gradients, images, patterns and video to a 112x16 flip-dot display over UDP.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Only log errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream the radial gradient, static or animated (runs until interrupted).
    Gradient {
        /// Animate the gradient with a motion profile: drift or orbit
        #[arg(long, value_name = "PROFILE")]
        animate: Option<MotionProfile>,

        /// Hard threshold instead of dithering
        #[arg(long)]
        no_dither: bool,

        #[command(flatten)]
        iterations: IterationArgs,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Stream a still image (PNG, JPEG, GIF or BMP).
    Image {
        /// Path to the image (glob patterns must match exactly one file)
        input: PathBuf,

        /// Scale mode: fill, stretch, fit or crop
        #[arg(long, default_value_t = ScaleMode::Fill)]
        scale: ScaleMode,

        /// Hard threshold instead of dithering
        #[arg(long)]
        no_dither: bool,

        #[command(flatten)]
        iterations: IterationArgs,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Stream a procedural pattern: fill, clear, rows, columns or random.
    Pattern {
        kind: PatternKind,

        /// Seed for the random pattern
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        iterations: IterationArgs,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Stream a video file, decoded with the system ffmpeg.
    Video {
        /// Path to the video (glob patterns must match exactly one file)
        input: PathBuf,

        /// Scale mode: fill, stretch, fit or crop
        #[arg(long, default_value_t = ScaleMode::Fill)]
        scale: ScaleMode,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Receive dot packets and simulate the display.
    Listen {
        /// Local address to bind
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,

        /// Stop after this many valid dots
        #[arg(long, value_name = "N")]
        packets: Option<NonZeroU64>,

        /// Render the board to the terminal on every flush
        #[arg(long)]
        debug: bool,
    },
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Display host name or address
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Display UDP port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Invert every dot
    #[arg(long)]
    invert: bool,

    /// Disable row and frame pacing
    #[arg(long)]
    no_delay: bool,

    /// Render every streamed frame to the terminal
    #[arg(long)]
    debug: bool,

    /// Print the session summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct IterationArgs {
    /// Number of frames to stream
    #[arg(long, value_name = "N", conflicts_with = "forever")]
    iterations: Option<NonZeroU32>,

    /// Stream until interrupted
    #[arg(long)]
    forever: bool,
}

impl IterationArgs {
    fn resolve(&self) -> Option<Iterations> {
        if self.forever {
            Some(Iterations::Forever)
        } else {
            self.iterations.map(Iterations::Count)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Gradient {
            animate,
            no_dither,
            iterations,
            session,
        } => cmd_gradient(animate, no_dither, iterations.resolve(), &session, quiet),
        Commands::Image {
            input,
            scale,
            no_dither,
            iterations,
            session,
        } => cmd_image(&input, scale, no_dither, iterations.resolve(), &session, quiet),
        Commands::Pattern {
            kind,
            seed,
            iterations,
            session,
        } => cmd_pattern(kind, seed, iterations.resolve(), &session, quiet),
        Commands::Video {
            input,
            scale,
            session,
        } => cmd_video(&input, scale, &session, quiet),
        Commands::Listen {
            bind,
            packets,
            debug,
        } => cmd_listen(&bind, packets, debug, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_gradient(
    animate: Option<MotionProfile>,
    no_dither: bool,
    iterations: Option<Iterations>,
    session: &SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let destination = resolve(session)?;
    let binarization = binarization(no_dither);
    let source: Source = match animate {
        Some(profile) => AnimatedGradient::new(profile, binarization, session.invert).into(),
        None => StaticGradient::new(binarization, session.invert).into(),
    };
    run_session(source, destination, iterations, session, quiet)
}

fn cmd_image(
    input: &Path,
    scale: ScaleMode,
    no_dither: bool,
    iterations: Option<Iterations>,
    session: &SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let destination = resolve(session)?;
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved, "use a PNG, JPEG, GIF or BMP image")?;

    let config = TransformConfig::still_image()
        .with_scale(scale)
        .with_binarization(binarization(no_dither))
        .with_invert(session.invert);
    let image = StaticImage::open(&resolved, &config).map_err(source_error)?;
    run_session(image.into(), destination, iterations, session, quiet)
}

fn cmd_pattern(
    kind: PatternKind,
    seed: Option<u64>,
    iterations: Option<Iterations>,
    session: &SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let destination = resolve(session)?;
    let pattern = match seed {
        Some(seed) => ProceduralPattern::with_seed(kind, seed),
        None => ProceduralPattern::new(kind),
    };
    if session.invert {
        warn!("--invert has no effect on patterns");
    }
    if seed.is_some() && kind != PatternKind::Random {
        warn!(pattern = %kind, "--seed only affects the random pattern");
    }
    run_session(pattern.into(), destination, iterations, session, quiet)
}

fn cmd_video(
    input: &Path,
    scale: ScaleMode,
    session: &SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let destination = resolve(session)?;
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved, "use a video file ffmpeg can decode")?;

    let config = TransformConfig::video()
        .with_scale(scale)
        .with_invert(session.invert);
    let video = VideoFrames::open(&resolved, config).map_err(source_error)?;
    run_session(video.into(), destination, None, session, quiet)
}

fn run_session(
    mut source: Source,
    destination: SocketAddr,
    iterations: Option<Iterations>,
    session: &SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = StreamConfig::for_source(source.kind()).with_debug(session.debug);
    if let Some(iterations) = iterations {
        config = config.with_iterations(iterations);
    }
    if session.no_delay {
        config = config.without_pacing();
    }

    let sink = UdpSink::open(destination).context("failed to open UDP socket")?;
    let mut streamer = Streamer::new(config, sink).with_destination(destination);
    if session.debug {
        streamer = streamer.with_renderer(TerminalRenderer::stdout());
    }
    info!(source = ?source.kind(), %destination, "starting session");

    let summary = streamer
        .run(&mut source)
        .context("streaming session aborted")?;
    print_summary(&summary, session.json, quiet)
}

fn print_summary(summary: &SessionSummary, json: bool, quiet: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(summary).context("JSON serialization failed")?;
        println!("{}", text);
        return Ok(());
    }
    if !quiet {
        eprintln!(
            "OK: sent {} bytes in {} packets ({} frames) -> {}",
            summary.bytes,
            summary.dots,
            summary.frames,
            summary.destination.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn cmd_listen(
    bind: &str,
    packets: Option<NonZeroU64>,
    debug: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut receiver = Receiver::bind(bind).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("choose another address with --bind".to_string()),
        )
    })?;
    let local = receiver.local_addr().context("failed to read local address")?;
    info!(%local, "listening");
    if !quiet {
        eprintln!("listening on {}", local);
    }

    let mut board = DotBoard::new();
    let mut renderer = debug.then(TerminalRenderer::stdout);
    let mut dots: u64 = 0;
    loop {
        match receiver.recv().context("receive failed")? {
            Some(Received::Dot { dot, from }) => {
                if let Err(err) = board.apply(dot) {
                    warn!(%from, error = %err, "ignoring dot");
                    continue;
                }
                dots += 1;
                let end_of_frame = usize::from(dot.column) == WIDTH - 1
                    && usize::from(dot.row) == HEIGHT - 1;
                let done = packets.is_some_and(|limit| dots >= limit.get());
                if end_of_frame || done {
                    flush_board(&mut board, &mut renderer);
                }
                if done {
                    break;
                }
            }
            Some(Received::Rejected { .. }) => {}
            None => {
                if board.has_pending() {
                    flush_board(&mut board, &mut renderer);
                }
            }
        }
    }

    if !quiet {
        eprintln!(
            "OK: received {} dots ({} rejected)",
            dots,
            receiver.rejected()
        );
    }
    Ok(())
}

fn flush_board(board: &mut DotBoard, renderer: &mut Option<TerminalRenderer<Stdout>>) {
    let changed = board.flush();
    debug!(changed = changed.len(), "board flushed");
    if let Some(active) = renderer.as_mut() {
        if let Err(err) = board.render(active) {
            warn!(error = %err, "debug rendering failed; disabling renderer");
            *renderer = None;
        }
    }
}

fn binarization(no_dither: bool) -> Binarization {
    if no_dither {
        Binarization::Threshold(DEFAULT_THRESHOLD)
    } else {
        Binarization::Dither
    }
}

fn resolve(session: &SessionArgs) -> Result<SocketAddr, CliError> {
    resolve_destination(&session.host, session.port).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("check --host and --port".to_string()),
        )
    })
}

fn source_error(err: SourceError) -> CliError {
    let hint = match &err {
        SourceError::Image { .. } => Some("use a readable PNG, JPEG, GIF or BMP image".to_string()),
        SourceError::VideoOpen { .. } => {
            Some("make sure ffmpeg and ffprobe are installed and on PATH".to_string())
        }
        SourceError::Io(_) | SourceError::VideoDecode(_) => None,
    };
    CliError::new(err.to_string(), hint)
}

fn validate_input_file(input: &Path, hint: &str) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(hint.to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(hint.to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
