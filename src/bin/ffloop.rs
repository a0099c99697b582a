use std::io::{IsTerminal as _, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ffloop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the plan (inputs, filter chain, output) without running ffmpeg.
    Plan(PlanArgs),
    /// Stream raw RGBA frames from ffmpeg to a file or stdout.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct LoopArgs {
    /// Input video file.
    input: PathBuf,

    /// JSON options file (camelCase keys); flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Pad the last frame forever instead of looping the source.
    #[arg(long)]
    no_loop: bool,

    /// Start offset in seconds.
    #[arg(long)]
    start: Option<f64>,

    /// Source duration in seconds (required with a non-zero --start).
    #[arg(long)]
    input_duration: Option<f64>,

    /// Crop width in source pixels.
    #[arg(long)]
    crop_width: Option<u32>,

    /// Crop height in source pixels.
    #[arg(long)]
    crop_height: Option<u32>,

    /// Crop x offset (centred when x/y are omitted).
    #[arg(long)]
    crop_x: Option<u32>,

    /// Crop y offset.
    #[arg(long)]
    crop_y: Option<u32>,

    /// ffmpeg binary to run.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// ffmpeg -loglevel value.
    #[arg(long, default_value = "error")]
    ffmpeg_loglevel: String,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    loop_args: LoopArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = PlanFormat::Json)]
    format: PlanFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlanFormat {
    /// Pretty-printed plan.
    Json,
    /// ffmpeg command line.
    Args,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    loop_args: LoopArgs,

    /// Stop after this many frames (default: run until ffmpeg stops).
    #[arg(long)]
    frames: Option<u64>,

    /// Output file for raw frames (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn init_tracing() {
    let ansi_enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled)
        .init();
}

impl LoopArgs {
    fn options(&self) -> anyhow::Result<ffloop::LoopOptions> {
        let base = match &self.config {
            Some(path) => ffloop::LoopOptions::from_path(path)
                .with_context(|| format!("load options '{}'", path.display()))?,
            None => ffloop::LoopOptions::default(),
        };
        let flags = ffloop::LoopOptions {
            fps: self.fps,
            width: self.width.map(f64::from),
            height: self.height.map(f64::from),
            looping: self.no_loop.then_some(false),
            start: self.start,
            input_duration: self.input_duration,
            crop_width: self.crop_width.map(f64::from),
            crop_height: self.crop_height.map(f64::from),
            crop_x: self.crop_x.map(f64::from),
            crop_y: self.crop_y.map(f64::from),
        };
        Ok(base.merged(&flags))
    }

    fn plan(&self) -> anyhow::Result<ffloop::LoopPlan> {
        let opts = self.options()?;
        let plan = ffloop::LoopPlan::build(&self.input, &opts)
            .with_context(|| format!("plan loop for '{}'", self.input.display()))?;
        Ok(plan)
    }

    fn ffmpeg_config(&self) -> ffloop::FfmpegConfig {
        ffloop::FfmpegConfig {
            log_level: self.ffmpeg_loglevel.clone(),
            ..ffloop::FfmpegConfig::new(&self.ffmpeg)
        }
    }
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let plan = args.loop_args.plan()?;
    let text = match args.format {
        PlanFormat::Json => plan.to_json_pretty()?,
        PlanFormat::Args => ffloop::command_line(&args.loop_args.ffmpeg_config(), &plan),
    };
    println!("{text}");
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let plan = args.loop_args.plan()?;
    let cfg = args.loop_args.ffmpeg_config();

    let mut out: Box<dyn std::io::Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = std::fs::File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            Box::new(std::io::BufWriter::new(f))
        }
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    let mut stream = ffloop::spawn(&cfg, &plan)?;
    let mut frame = Vec::with_capacity(stream.frame_len());
    let mut written = 0u64;
    let mut downstream_closed = false;
    while args.frames.is_none_or(|limit| written < limit) {
        if !stream.read_frame_into(&mut frame)? {
            break;
        }
        match out.write_all(&frame) {
            Ok(()) => written += 1,
            // A closed downstream pipe (e.g. `| head -c`) is a normal way to stop.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                downstream_closed = true;
                break;
            }
            Err(e) => return Err(e).context("write frame"),
        }
    }
    stream.kill()?;
    if !downstream_closed {
        out.flush().context("flush output")?;
    }

    tracing::info!(frames = written, size = %plan.output().size, "done");
    if let Some(path) = &args.out {
        eprintln!("wrote {written} frames to {}", path.display());
    }
    Ok(())
}
