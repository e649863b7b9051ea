//! # framedump
//!
//! Decode a video and dump every Nth frame to disk as an image, one
//! auto-numbered run directory per invocation.
//!
//! Decoding goes through FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); frames are encoded
//! with the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ### One run, the way the CLI does it
//!
//! ```no_run
//! use framedump::{ExtractOptions, RunConfig};
//!
//! let config = RunConfig::new("Videos/My Project/Zoom.mp4").with_frame_interval(10);
//! let report = framedump::run(&config, ExtractOptions::new())?;
//!
//! // runs/Zoom_My Project_run1/extracted_frames/frame_000000.png, ...
//! println!("{}", report.run.frames_dir().display());
//! println!("saved {} frames", report.summary.frames_saved);
//! # Ok::<(), framedump::FramedumpError>(())
//! ```
//!
//! ### Extract into a folder of your choosing
//!
//! ```no_run
//! use framedump::ExtractOptions;
//!
//! let options = ExtractOptions::new().with_frame_interval(25).with_image_extension("jpg");
//! let summary = framedump::extract_frames("input.mp4", "frames", &options)?;
//! # Ok::<(), framedump::FramedumpError>(())
//! ```
//!
//! ## Layout
//!
//! `<runs_dir>/<video stem>_<containing folder>_run<N>/extracted_frames/frame_<index:06>.png`
//!
//! `N` is one more than the highest run number already present for the same
//! video stem and folder name, so runs are never overwritten.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

mod conversion;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod job;
pub mod metadata;
pub mod progress;
pub mod run_directory;
pub mod source;

pub use config::{
    DEFAULT_FRAME_INTERVAL, DEFAULT_FRAMES_PER_SECOND, DEFAULT_IMAGE_EXTENSION, DEFAULT_RUNS_DIR,
    ExtractOptions, PixelFormat, RunConfig,
};
pub use error::{ErrorCategory, FramedumpError};
pub use extractor::{
    ExtractionSummary, FrameWriteFailure, StopReason, extract_frames, extract_from_source,
    frame_file_name, is_sampled,
};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use job::{RunReport, ensure_runs_dir, peek_run_number, run};
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use run_directory::{
    FRAMES_DIR_NAME, RunDirectory, next_run_number, run_directory_name, run_prefix, video_names,
};
pub use source::{FrameSource, VideoSource};
