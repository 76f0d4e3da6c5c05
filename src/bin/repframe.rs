use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use repframe::{
    ExtractOptions, FfmpegLogLevel, MediaFile, OperationType, ProgressCallback, ProgressInfo,
    ThumbnailOptions, batch, thumbnail,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  repframe thumbnail input.mp4 --out thumb.png --max-dimension 320\n  repframe probe input.mkv --json\n  repframe pick a.mp4 b.webm c.avi --out cover.jpg --progress\n  repframe completions zsh > _repframe";

#[derive(Debug, Parser)]
#[command(
    name = "repframe",
    version,
    about = "Pick a representative thumbnail frame from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while decoding.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Abort frame acquisition after this many seconds.
    #[arg(long, global = true)]
    timeout: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the representative frame of a video to an image file.
    #[command(
        about = "Extract a representative thumbnail",
        after_help = "Examples:\n  repframe thumbnail input.mp4 --out thumb.png\n  repframe thumbnail input.mp4 --out thumb.jpg --max-dimension 256 --max-source-width 3840"
    )]
    Thumbnail {
        /// Input media path.
        input: PathBuf,
        /// Output image path; the format follows the extension.
        #[arg(long)]
        out: PathBuf,
        /// Longest edge of the written thumbnail.
        #[arg(long)]
        max_dimension: Option<u32>,
        /// Reject sources wider than this.
        #[arg(long)]
        max_source_width: Option<u32>,
        /// Reject sources taller than this.
        #[arg(long)]
        max_source_height: Option<u32>,
    },

    /// Print metadata for a media file.
    #[command(
        about = "Print media metadata",
        visible_alias = "info",
        after_help = "Examples:\n  repframe probe input.mp4\n  repframe probe input.mp4 --json"
    )]
    Probe {
        /// Input media path.
        input: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Thumbnail the first candidate, in argument order, that yields a frame.
    #[command(about = "Thumbnail the first usable candidate")]
    Pick {
        /// Candidate media paths, in priority order.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output image path.
        #[arg(long)]
        out: PathBuf,
        /// Longest edge of the written thumbnail.
        #[arg(long)]
        max_dimension: Option<u32>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timeout(value: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    let invalid = || format!("--timeout must be a positive number of seconds, got {value}");
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid().into());
    }
    Duration::try_from_secs_f64(value).map_err(|_| invalid().into())
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn thumbnail_options(
    max_dimension: Option<u32>,
    max_source_width: Option<u32>,
    max_source_height: Option<u32>,
) -> ThumbnailOptions {
    ThumbnailOptions {
        max_source_width,
        max_source_height,
        max_dimension,
    }
}

fn base_extract_options(
    global: &GlobalOptions,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new();

    if let Some(seconds) = global.timeout {
        options = options.with_timeout(parse_timeout(seconds)?);
    }

    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }

    Ok(options)
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        repframe::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg:>10} {bar:40.cyan/blue} {pos}/{len}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let label = match info.operation {
            OperationType::FrameAcquisition => "frames",
            OperationType::CandidateBatch => "candidates",
            _ => "working",
        };
        self.bar.set_message(label);
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Thumbnail {
            input,
            out,
            max_dimension,
            max_source_width,
            max_source_height,
        } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let options = base_extract_options(&cli.global)?;
            let limits = thumbnail_options(max_dimension, max_source_width, max_source_height);

            let mut media = MediaFile::open(&input)?;
            let image = media.thumbnail_with_options(&limits, &options)?;
            thumbnail::save_image(&image, &out, cli.global.overwrite)?;

            if cli.global.verbose {
                eprintln!(
                    "{} {} ({}x{})",
                    "wrote".green().bold(),
                    out.display(),
                    image.width(),
                    image.height()
                );
            }
        }
        Commands::Probe { input, json } => {
            let media = MediaFile::open(&input)?;
            let metadata = media.metadata();
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "has_audio": metadata.has_audio,
                    "tags": metadata.tags,
                    "video": metadata.video.as_ref().map(|video| json!({
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "codec": video.codec,
                        "pixel_format": video.pixel_format,
                        "stream_index": video.stream_index,
                    })),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                println!("Audio: {}", if metadata.has_audio { "yes" } else { "no" });
                if let Some(video) = &metadata.video {
                    println!(
                        "Video: {}x{} @ {:.2} fps [{}]",
                        video.width, video.height, video.frames_per_second, video.codec,
                    );
                } else {
                    println!("Video: none");
                }
                if let Some(tags) = &metadata.tags {
                    let mut keys: Vec<_> = tags.keys().collect();
                    keys.sort();
                    for key in keys {
                        println!("  {key}: {}", tags[key]);
                    }
                }
            }
        }
        Commands::Pick {
            inputs,
            out,
            max_dimension,
        } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let options = base_extract_options(&cli.global)?;
            let limits = thumbnail_options(max_dimension, None, None);

            let (index, image) = batch::thumbnail_first(&inputs, &limits, &options)?;
            thumbnail::save_image(&image, &out, cli.global.overwrite)?;

            if cli.global.verbose {
                eprintln!(
                    "{} {} from {}",
                    "wrote".green().bold(),
                    out.display(),
                    inputs[index].display()
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "repframe", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
