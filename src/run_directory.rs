//! Auto-numbered run directories.
//!
//! Every invocation writes into `<runs_dir>/<base>_<folder>_run<N>`, where
//! `<base>` is the video's file stem, `<folder>` is the name of the directory
//! containing the video, and `N` is one more than the highest number already
//! used for that pair.
//!
//! # Example
//!
//! ```no_run
//! use framedump::RunDirectory;
//!
//! let run = RunDirectory::create_next("runs", "Zoom", "My Project")?;
//! assert!(run.frames_dir().ends_with("extracted_frames"));
//! # Ok::<(), framedump::FramedumpError>(())
//! ```

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::error::FramedumpError;

/// Sub-directory of a run that receives the extracted frames.
pub const FRAMES_DIR_NAME: &str = "extracted_frames";

/// How many run numbers [`RunDirectory::create_next`] tries before giving up.
const MAX_CREATE_ATTEMPTS: u32 = 100;

/// Common prefix of every run directory for one `(video, folder)` pair.
pub fn run_prefix(video_base_name: &str, containing_folder_name: &str) -> String {
    format!("{video_base_name}_{containing_folder_name}_run")
}

/// Directory name of run `run_number` for one `(video, folder)` pair.
pub fn run_directory_name(
    video_base_name: &str,
    containing_folder_name: &str,
    run_number: u32,
) -> String {
    format!(
        "{}{run_number}",
        run_prefix(video_base_name, containing_folder_name)
    )
}

/// Split a video path into its base name (file stem) and the name of the
/// folder that contains it.
///
/// A path with no parent directory (`"clip.mp4"`) yields an empty folder
/// name.
pub fn video_names(video_path: &Path) -> (String, String) {
    let base_name = video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let folder_name = video_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (base_name, folder_name)
}

/// Parse the run number out of a directory name, if it belongs to `prefix`.
///
/// The suffix after the prefix must be a non-empty run of ASCII digits that
/// fits in a `u32`.
fn parse_run_number(directory_name: &str, prefix: &str) -> Option<u32> {
    let suffix = directory_name.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Next unused run number for a `(video, folder)` pair under `runs_dir`.
///
/// Scans the immediate sub-directories of `runs_dir` whose name starts with
/// [`run_prefix`] and returns one more than the highest numeric suffix, or
/// `1` if there is none. Entries with a non-numeric suffix are ignored.
///
/// This is a plain query; two processes calling it at the same time get the
/// same answer. [`RunDirectory::create_next`] guards against that.
///
/// # Errors
///
/// Returns [`FramedumpError::IoError`] if `runs_dir` cannot be listed.
pub fn next_run_number(
    runs_dir: &Path,
    video_base_name: &str,
    containing_folder_name: &str,
) -> Result<u32, FramedumpError> {
    let prefix = run_prefix(video_base_name, containing_folder_name);

    let mut highest: Option<u32> = None;
    for entry in fs::read_dir(runs_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if let Some(number) = parse_run_number(&name, &prefix) {
            highest = Some(highest.map_or(number, |current| current.max(number)));
        }
    }

    Ok(highest.map_or(1, |number| number.saturating_add(1)))
}

/// One run's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    runs_dir: PathBuf,
    video_base_name: String,
    containing_folder_name: String,
    run_number: u32,
}

impl RunDirectory {
    /// Describe run `run_number` without touching the filesystem.
    pub fn new(
        runs_dir: impl Into<PathBuf>,
        video_base_name: impl Into<String>,
        containing_folder_name: impl Into<String>,
        run_number: u32,
    ) -> Self {
        Self {
            runs_dir: runs_dir.into(),
            video_base_name: video_base_name.into(),
            containing_folder_name: containing_folder_name.into(),
            run_number,
        }
    }

    /// Claim and create the next free run directory, plus its
    /// [`FRAMES_DIR_NAME`] sub-directory.
    ///
    /// Starts from [`next_run_number`] and creates the run directory with a
    /// non-recursive create. If another process got there first the number
    /// is bumped and the create retried.
    ///
    /// # Errors
    ///
    /// - [`FramedumpError::IoError`] if `runs_dir` cannot be listed.
    /// - [`FramedumpError::CreateDirectory`] if a directory cannot be
    ///   created for any reason other than a name collision.
    /// - [`FramedumpError::RunNumbersExhausted`] if every attempt collided.
    pub fn create_next(
        runs_dir: impl Into<PathBuf>,
        video_base_name: impl Into<String>,
        containing_folder_name: impl Into<String>,
    ) -> Result<Self, FramedumpError> {
        let runs_dir = runs_dir.into();
        let video_base_name = video_base_name.into();
        let containing_folder_name = containing_folder_name.into();

        let mut run_number = next_run_number(&runs_dir, &video_base_name, &containing_folder_name)?;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let run = Self::new(
                runs_dir.clone(),
                video_base_name.clone(),
                containing_folder_name.clone(),
                run_number,
            );
            let path = run.path();

            match fs::create_dir(&path) {
                Ok(()) => {
                    log::info!("Created run directory: {}", path.display());
                    let frames_dir = run.frames_dir();
                    fs::create_dir_all(&frames_dir).map_err(|source| {
                        FramedumpError::CreateDirectory {
                            path: frames_dir.clone(),
                            source,
                        }
                    })?;
                    log::info!("Created '{FRAMES_DIR_NAME}' directory: {}", frames_dir.display());
                    return Ok(run);
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("Run directory {} already taken, trying next number", path.display());
                    run_number = run_number.saturating_add(1);
                }
                Err(source) => return Err(FramedumpError::CreateDirectory { path, source }),
            }
        }

        Err(FramedumpError::RunNumbersExhausted {
            runs_dir,
            attempts: MAX_CREATE_ATTEMPTS,
        })
    }

    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    pub fn video_base_name(&self) -> &str {
        &self.video_base_name
    }

    pub fn containing_folder_name(&self) -> &str {
        &self.containing_folder_name
    }

    /// `<runs_dir>/<base>_<folder>_run<N>`.
    pub fn path(&self) -> PathBuf {
        self.runs_dir.join(run_directory_name(
            &self.video_base_name,
            &self.containing_folder_name,
            self.run_number,
        ))
    }

    /// `<runs_dir>/<base>_<folder>_run<N>/extracted_frames`.
    pub fn frames_dir(&self) -> PathBuf {
        self.path().join(FRAMES_DIR_NAME)
    }
}
