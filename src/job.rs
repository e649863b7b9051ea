//! The entry routine: set up a run directory and extract into it.

use std::{fs, path::Path};

use crate::{
    config::{ExtractOptions, RunConfig},
    error::FramedumpError,
    extractor::{ExtractionSummary, extract_frames},
    run_directory::{RunDirectory, next_run_number, video_names},
};

/// Result of [`run`]: where the frames went and how extraction went.
#[derive(Debug)]
#[must_use]
pub struct RunReport {
    pub run: RunDirectory,
    pub summary: ExtractionSummary,
}

/// Create `runs_dir` if needed, log which state it was in.
pub fn ensure_runs_dir(runs_dir: &Path) -> Result<(), FramedumpError> {
    if runs_dir.is_dir() {
        log::info!("'runs' directory already exists at: {}", runs_dir.display());
        return Ok(());
    }
    fs::create_dir_all(runs_dir).map_err(|source| FramedumpError::CreateDirectory {
        path: runs_dir.to_path_buf(),
        source,
    })?;
    log::info!("Created 'runs' directory at: {}", runs_dir.display());
    Ok(())
}

/// Run number the next [`run`] for `config` would get, without creating
/// anything.
///
/// A missing runs directory has no runs in it, so the answer is `1`.
pub fn peek_run_number(config: &RunConfig) -> Result<u32, FramedumpError> {
    if !config.runs_dir.is_dir() {
        return Ok(1);
    }
    let (base_name, folder_name) = video_names(&config.video_path);
    next_run_number(&config.runs_dir, &base_name, &folder_name)
}

/// Extract `config.video_path` into a fresh run directory.
///
/// `options` supplies progress and cancellation; its frame interval, image
/// extension, and pixel format are overridden by `config`.
///
/// The video is checked before any directory is created, so a bad path
/// leaves the runs directory untouched.
///
/// # Errors
///
/// Any setup failure from [`RunDirectory::create_next`] or
/// [`extract_frames`]. Failures after decoding starts are reported in the
/// returned summary instead.
///
/// # Example
///
/// ```no_run
/// use framedump::RunConfig;
///
/// let config = RunConfig::new("Videos/My Project/Zoom.mp4").with_frame_interval(10);
/// let report = framedump::run(&config, framedump::ExtractOptions::new())?;
/// println!("run {} -> {}", report.run.run_number(), report.run.frames_dir().display());
/// # Ok::<(), framedump::FramedumpError>(())
/// ```
pub fn run(config: &RunConfig, options: ExtractOptions) -> Result<RunReport, FramedumpError> {
    let options = options
        .with_frame_interval(config.frame_interval)
        .with_image_extension(&config.image_extension)
        .with_pixel_format(config.pixel_format);
    options.validate()?;

    if !config.video_path.is_file() {
        return Err(FramedumpError::VideoNotFound {
            path: config.video_path.clone(),
        });
    }

    ensure_runs_dir(&config.runs_dir)?;

    let (base_name, folder_name) = video_names(&config.video_path);
    let run = RunDirectory::create_next(&config.runs_dir, base_name, folder_name)?;

    let summary = extract_frames(&config.video_path, run.frames_dir(), &options)?;
    Ok(RunReport { run, summary })
}
