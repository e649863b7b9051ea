//! The frame extraction loop.
//!
//! [`extract_frames`] performs the setup checks for a video file and then
//! hands an opened [`VideoSource`] to [`extract_from_source`], which decodes
//! sequentially and saves every Nth frame as `frame_<index>.<ext>`.
//!
//! Once the loop has started, nothing escapes it as an error: write
//! failures, interruption, and decoder faults are folded into the returned
//! [`ExtractionSummary`], and the source is dropped (releasing the file)
//! before the summary is handed back.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use image::ImageFormat;

use crate::{
    config::{DEFAULT_FRAMES_PER_SECOND, ExtractOptions},
    error::FramedumpError,
    progress::ProgressTracker,
    source::{FrameSource, VideoSource},
};

/// Why the extraction loop stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The source ran out of frames.
    EndOfStream,
    /// The cancellation token was triggered.
    Interrupted,
    /// The source failed mid-stream.
    Failed(FramedumpError),
}

impl StopReason {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, StopReason::EndOfStream)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, StopReason::Interrupted)
    }
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StopReason::EndOfStream => write!(f, "end of stream"),
            StopReason::Interrupted => write!(f, "{}", FramedumpError::Interrupted),
            StopReason::Failed(error) => write!(f, "{error}"),
        }
    }
}

/// A frame that was selected for saving but could not be written.
#[derive(Debug)]
pub struct FrameWriteFailure {
    pub frame_index: u64,
    pub path: PathBuf,
    /// Always [`FramedumpError::FrameWrite`].
    pub error: FramedumpError,
}

/// Outcome of one extraction.
#[derive(Debug)]
#[must_use]
pub struct ExtractionSummary {
    /// Frames read from the source, saved or not.
    pub frames_processed: u64,
    /// Frames successfully written.
    pub frames_saved: u64,
    /// Frames selected for saving whose write failed.
    pub write_failures: Vec<FrameWriteFailure>,
    pub stop_reason: StopReason,
    /// Directory the frames were written to.
    pub output_folder: PathBuf,
    pub elapsed: Duration,
}

/// File name of the frame at `frame_index`: six zero-padded digits.
pub fn frame_file_name(frame_index: u64, extension: &str) -> String {
    format!("frame_{frame_index:06}.{extension}")
}

/// Whether the frame at `frame_index` is saved under `frame_interval`.
pub fn is_sampled(frame_index: u64, frame_interval: u64) -> bool {
    frame_interval > 0 && frame_index % frame_interval == 0
}

/// Extract every Nth frame of the video at `video_path` into
/// `output_folder`.
///
/// `output_folder` is created (recursively) if missing. If it already
/// exists it is used as-is: files from an earlier run at the same indices
/// are overwritten, others are left alone.
///
/// # Errors
///
/// Only setup failures are returned, before anything is written:
///
/// - [`FramedumpError::InvalidInterval`] / [`FramedumpError::UnsupportedImageFormat`]
///   for unusable options.
/// - [`FramedumpError::VideoNotFound`] if `video_path` is not a regular file.
/// - [`FramedumpError::CreateDirectory`] if `output_folder` cannot be
///   created.
/// - [`FramedumpError::FileOpen`] / [`FramedumpError::NoVideoStream`] if
///   the video cannot be decoded.
///
/// # Example
///
/// ```no_run
/// use framedump::{ExtractOptions, FramedumpError};
///
/// let options = ExtractOptions::new().with_frame_interval(30);
/// let summary = framedump::extract_frames("input.mp4", "frames", &options)?;
/// println!("saved {} of {} frames", summary.frames_saved, summary.frames_processed);
/// # Ok::<(), FramedumpError>(())
/// ```
pub fn extract_frames(
    video_path: impl AsRef<Path>,
    output_folder: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionSummary, FramedumpError> {
    let video_path = video_path.as_ref();
    let output_folder = output_folder.as_ref();

    options.validate()?;

    if !video_path.is_file() {
        return Err(FramedumpError::VideoNotFound {
            path: video_path.to_path_buf(),
        });
    }

    ensure_output_folder(output_folder)?;

    let source = VideoSource::open(video_path)?.with_pixel_format(options.pixel_format());

    log::debug!(
        "Starting frame extraction from '{}' with an interval of every {} frames",
        video_path.display(),
        options.frame_interval(),
    );

    extract_from_source(source, output_folder, options)
}

fn ensure_output_folder(output_folder: &Path) -> Result<(), FramedumpError> {
    if output_folder.is_dir() {
        log::info!("Output folder already exists: {}", output_folder.display());
        return Ok(());
    }

    fs::create_dir_all(output_folder).map_err(|source| FramedumpError::CreateDirectory {
        path: output_folder.to_path_buf(),
        source,
    })?;
    log::info!("Created output folder: {}", output_folder.display());
    Ok(())
}

/// Run the extraction loop over any [`FrameSource`].
///
/// `output_folder` must already exist. The source is consumed and dropped
/// before this returns, whatever ended the loop.
///
/// # Errors
///
/// Returns an error only if `options` are unusable (zero interval or
/// unknown image extension), before any frame is read.
pub fn extract_from_source<S: FrameSource>(
    mut source: S,
    output_folder: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionSummary, FramedumpError> {
    let output_folder = output_folder.as_ref();
    let image_format = options.validate()?;

    let total_frames = source.total_frames().filter(|&total| total > 0);
    let frames_per_second = source
        .frames_per_second()
        .filter(|&fps| fps > 0.0)
        .unwrap_or(DEFAULT_FRAMES_PER_SECOND);

    match total_frames {
        Some(total) => log::debug!("Source reports {total} frames at {frames_per_second:.2} fps"),
        None => log::debug!("Source frame count unknown ({frames_per_second:.2} fps)"),
    }

    let start = Instant::now();
    let mut tracker = ProgressTracker::new(options.progress.clone(), total_frames, options.batch_size);
    let mut counters = LoopCounters::default();

    let stop_reason = run_loop(
        &mut source,
        output_folder,
        options,
        image_format,
        &mut tracker,
        &mut counters,
    );

    tracker.finish();
    drop(source);

    log::info!(
        "Finished processing ({stop_reason}): {} frames processed, {} frames saved",
        counters.frame_count,
        counters.saved_count,
    );

    Ok(ExtractionSummary {
        frames_processed: counters.frame_count,
        frames_saved: counters.saved_count,
        write_failures: counters.write_failures,
        stop_reason,
        output_folder: output_folder.to_path_buf(),
        elapsed: start.elapsed(),
    })
}

#[derive(Default)]
struct LoopCounters {
    frame_count: u64,
    saved_count: u64,
    write_failures: Vec<FrameWriteFailure>,
}

fn run_loop<S: FrameSource>(
    source: &mut S,
    output_folder: &Path,
    options: &ExtractOptions,
    image_format: ImageFormat,
    tracker: &mut ProgressTracker,
    counters: &mut LoopCounters,
) -> StopReason {
    loop {
        if options.is_cancelled() {
            return StopReason::Interrupted;
        }

        let frame = match source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return StopReason::EndOfStream,
            Err(error) => return StopReason::Failed(error),
        };

        let frame_index = counters.frame_count;
        if is_sampled(frame_index, options.frame_interval()) {
            let path = output_folder.join(frame_file_name(frame_index, options.image_extension()));
            match frame.save_with_format(&path, image_format) {
                Ok(()) => counters.saved_count += 1,
                Err(source) => {
                    let error = FramedumpError::FrameWrite {
                        frame_index,
                        source,
                    };
                    log::warn!("{error}");
                    counters.write_failures.push(FrameWriteFailure {
                        frame_index,
                        path,
                        error,
                    });
                }
            }
        }

        counters.frame_count += 1;
        tracker.advance(frame_index);
    }
}
