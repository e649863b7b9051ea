use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framedump::{
    CancellationToken, DEFAULT_FRAME_INTERVAL, DEFAULT_IMAGE_EXTENSION, DEFAULT_RUNS_DIR,
    ExtractOptions, ExtractionSummary, FfmpegLogLevel, PixelFormat, ProgressCallback,
    ProgressInfo, RunConfig, StopReason, VideoSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framedump extract \"Videos/My Project/Zoom.mp4\"\n  framedump extract lecture.mp4 --interval 30 --runs-dir out --ext jpg\n  framedump next-run lecture.mp4\n  framedump probe lecture.mp4 --json\n  framedump completions zsh > _framedump";

#[derive(Debug, Parser)]
#[command(
    name = "framedump",
    version,
    about = "Save every Nth frame of a video into an auto-numbered run directory",
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
    /// Show informational logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract every Nth frame into a new run directory.
    #[command(
        about = "Extract frames into a new run",
        after_help = "Examples:\n  framedump extract input.mp4\n  framedump extract input.mp4 --interval 5 --pixel-format gray8"
    )]
    Extract {
        /// Input video path.
        video_path: PathBuf,
        /// Save every Nth frame, starting with frame 0.
        #[arg(short = 'n', long, default_value_t = DEFAULT_FRAME_INTERVAL)]
        interval: u64,
        /// Directory that holds the run directories.
        #[arg(long, default_value = DEFAULT_RUNS_DIR)]
        runs_dir: PathBuf,
        /// Output image extension (png, jpg, jpeg, bmp, tiff, ...).
        #[arg(long, default_value = DEFAULT_IMAGE_EXTENSION)]
        ext: String,
        /// Pixel format of saved frames (rgb8, rgba8, gray8).
        #[arg(long, default_value = "rgb8")]
        pixel_format: String,
        /// Do not draw a progress bar.
        #[arg(long)]
        no_progress: bool,
    },

    /// Print the run number the next extraction would use.
    #[command(about = "Print the next run number")]
    NextRun {
        /// Input video path. Only its name and folder are used.
        video_path: PathBuf,
        /// Directory that holds the run directories.
        #[arg(long, default_value = DEFAULT_RUNS_DIR)]
        runs_dir: PathBuf,
    },

    /// Print video metadata (alias: info).
    #[command(about = "Print video metadata", visible_alias = "info")]
    Probe {
        /// Input video path.
        video_path: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_pixel_format(value: &str) -> Option<PixelFormat> {
    match value.to_ascii_lowercase().as_str() {
        "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
        "rgba8" | "rgba" => Some(PixelFormat::Rgba8),
        "gray8" | "gray" | "greyscale" | "grayscale" => Some(PixelFormat::Gray8),
        _ => None,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Renders extraction progress with an `indicatif` bar, or a spinner when
/// the frame count is unknown.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{msg} {bar:40.cyan/blue} {pos}/{len} frames [{elapsed_precise}<{eta_precise}]",
                    )?
                    .progress_chars("##-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(ProgressStyle::with_template(
                    "{spinner:.green} {msg} {pos} frames [{elapsed_precise}]",
                )?);
                bar
            }
        };
        bar.set_message("Extracting frames");
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
    }

    fn on_finish(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        self.bar.finish_and_clear();
    }
}

fn install_interrupt_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(error) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Could not install Ctrl-C handler: {error}");
    }
    token
}

fn print_summary(summary: &ExtractionSummary) {
    match &summary.stop_reason {
        StopReason::EndOfStream => {}
        StopReason::Interrupted => {
            eprintln!("\n{}", "Extraction interrupted by user.".yellow().bold());
        }
        StopReason::Failed(error) => {
            eprintln!(
                "\n{} {}",
                "error:".red().bold(),
                format!("An unexpected error occurred: {error}").red()
            );
        }
    }

    println!("\nFinished processing.");
    println!("Total frames processed: {}", summary.frames_processed);
    println!("Total frames saved: {}", summary.frames_saved);
    log::info!("Extraction took {:.2?}", summary.elapsed);
    if !summary.write_failures.is_empty() {
        println!(
            "{}",
            format!("Frames that failed to save: {}", summary.write_failures.len()).yellow()
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let ffmpeg_level: FfmpegLogLevel = cli.global.log_level.parse()?;
    framedump::set_ffmpeg_log_level(ffmpeg_level);

    match cli.command {
        Commands::Extract {
            video_path,
            interval,
            runs_dir,
            ext,
            pixel_format,
            no_progress,
        } => {
            let pixel_format = parse_pixel_format(&pixel_format)
                .ok_or(format!("unsupported --pixel-format: {pixel_format}"))?;
            let config = RunConfig::new(video_path)
                .with_frame_interval(interval)
                .with_runs_dir(runs_dir)
                .with_image_extension(ext)
                .with_pixel_format(pixel_format);

            let mut options = ExtractOptions::new().with_cancellation(install_interrupt_handler());

            if !no_progress && config.video_path.is_file() {
                // A probe failure is reported properly by the run below.
                let total = VideoSource::open(&config.video_path)
                    .ok()
                    .and_then(|source| source.metadata().total_frames());
                options = options.with_progress(Arc::new(TerminalProgress::new(total)?));
            }

            println!(
                "Starting frame extraction from '{}' with an interval of every {} frames.",
                config.video_path.display(),
                config.frame_interval
            );

            let report = framedump::run(&config, options)?;
            println!(
                "{} {}",
                "run:".green().bold(),
                report.run.frames_dir().display()
            );
            print_summary(&report.summary);
        }
        Commands::NextRun {
            video_path,
            runs_dir,
        } => {
            let config = RunConfig::new(video_path).with_runs_dir(runs_dir);
            println!("{}", framedump::peek_run_number(&config)?);
        }
        Commands::Probe { video_path, json } => {
            let source = VideoSource::open(&video_path)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width,
                    metadata.height,
                    metadata.frames_per_second_or_default(),
                    metadata.codec,
                );
                match metadata.total_frames() {
                    Some(total) => println!("Frames: {total}"),
                    None => println!("Frames: unknown"),
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framedump", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {}", "error:".red().bold(), error.to_string().red());
        std::process::exit(1);
    }
}
