//! Error types for the `framedump` crate.
//!
//! [`FramedumpError`] is the single error type returned by every fallible
//! operation. [`ErrorCategory`] groups its variants into the four kinds of
//! failure an extraction run can hit, which is what callers usually branch on.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framedump` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramedumpError {
    /// The input path does not point at an existing regular file.
    #[error("Video file '{}' does not exist", path.display())]
    VideoNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// A directory could not be created.
    #[error("Failed to create directory '{}': {source}", path.display())]
    CreateDirectory {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        source: IoError,
    },

    /// The video file could not be opened by the decoding backend.
    #[error("Failed to open video file at {}: {reason}", path.display())]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A frame interval of zero was provided.
    #[error("Frame interval must be greater than zero")]
    InvalidInterval,

    /// The requested image extension has no known encoder.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// Every candidate run number was already taken while creating a run.
    #[error("Could not claim a run directory under '{}' after {attempts} attempts", runs_dir.display())]
    RunNumbersExhausted {
        /// Directory the runs live in.
        runs_dir: PathBuf,
        /// How many numbers were tried.
        attempts: u32,
    },

    /// A single frame could not be written to disk.
    #[error("Error saving frame {frame_index}: {source}")]
    FrameWrite {
        /// Index of the frame that failed.
        frame_index: u64,
        /// Encoder or I/O failure.
        source: ImageError,
    },

    /// The extraction was interrupted by the user.
    #[error("Extraction interrupted by user")]
    Interrupted,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate outside of a frame write.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FramedumpError {
    fn from(error: FfmpegError) -> Self {
        FramedumpError::FfmpegError(error.to_string())
    }
}

/// Coarse classification of a [`FramedumpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Input checks, directory creation, or decoder open failed. Nothing was
    /// extracted.
    Setup,
    /// One frame failed to save. Extraction carries on.
    FrameWrite,
    /// The user asked to stop.
    Interrupted,
    /// Anything that went wrong mid-stream.
    Unexpected,
}

impl FramedumpError {
    /// Which of the four failure kinds this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FramedumpError::VideoNotFound { .. }
            | FramedumpError::CreateDirectory { .. }
            | FramedumpError::FileOpen { .. }
            | FramedumpError::NoVideoStream
            | FramedumpError::InvalidInterval
            | FramedumpError::UnsupportedImageFormat(_)
            | FramedumpError::RunNumbersExhausted { .. } => ErrorCategory::Setup,
            FramedumpError::FrameWrite { .. } => ErrorCategory::FrameWrite,
            FramedumpError::Interrupted => ErrorCategory::Interrupted,
            FramedumpError::VideoDecodeError(_)
            | FramedumpError::FfmpegError(_)
            | FramedumpError::IoError(_)
            | FramedumpError::ImageError(_) => ErrorCategory::Unexpected,
        }
    }
}
