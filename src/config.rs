//! Run and extraction configuration.
//!
//! [`RunConfig`] names *what* to extract: the input video, the sampling
//! stride, and where runs are stored. [`ExtractOptions`] is a builder that
//! threads progress callbacks, cancellation tokens, and output settings
//! through [`extract_frames`](crate::extract_frames) without widening its
//! signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framedump::{CancellationToken, ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} frames read", info.current);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_frame_interval(5)
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone());
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::PathBuf,
    sync::Arc,
};

use ffmpeg_next::format::Pixel;
use image::ImageFormat;

use crate::{
    error::FramedumpError,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// Sampling stride used when none is configured.
pub const DEFAULT_FRAME_INTERVAL: u64 = 10;

/// Frame rate assumed when the container does not report one.
pub const DEFAULT_FRAMES_PER_SECOND: f64 = 30.0;

/// Directory runs are created in when none is configured.
pub const DEFAULT_RUNS_DIR: &str = "runs";

/// Extension, and therefore encoder, used for saved frames by default.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Pixel layout of decoded frames before they are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit RGBA with alpha set to 255 (32 bpp).
    Rgba8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Rgba8 => Pixel::RGBA,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    /// Bytes each pixel occupies in a tightly packed buffer.
    pub(crate) fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Everything one invocation needs: the input video and where its run goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Video to decode.
    pub video_path: PathBuf,
    /// Save every `frame_interval`-th frame, starting with frame 0.
    pub frame_interval: u64,
    /// Directory that holds one sub-directory per run.
    pub runs_dir: PathBuf,
    /// Extension of saved frames; selects the encoder.
    pub image_extension: String,
    /// Pixel layout frames are converted to before encoding.
    pub pixel_format: PixelFormat,
}

impl RunConfig {
    /// Configuration for `video_path` with every other setting at its default.
    pub fn new(video_path: impl Into<PathBuf>) -> Self {
        Self {
            video_path: video_path.into(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            runs_dir: PathBuf::from(DEFAULT_RUNS_DIR),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            pixel_format: PixelFormat::default(),
        }
    }

    #[must_use]
    pub fn with_frame_interval(mut self, frame_interval: u64) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    #[must_use]
    pub fn with_runs_dir(mut self, runs_dir: impl Into<PathBuf>) -> Self {
        self.runs_dir = runs_dir.into();
        self
    }

    #[must_use]
    pub fn with_image_extension(mut self, extension: impl Into<String>) -> Self {
        self.image_extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Extraction options carrying this configuration's output settings.
    ///
    /// Progress and cancellation are left at their defaults; attach them to
    /// the returned builder.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new()
            .with_frame_interval(self.frame_interval)
            .with_image_extension(&self.image_extension)
            .with_pixel_format(self.pixel_format)
    }
}

/// Configuration for a single extraction call.
///
/// All fields have defaults: every 10th frame, PNG output, RGB8 pixels, no
/// progress reporting, never cancelled.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) frame_interval: u64,
    pub(crate) image_extension: String,
    pub(crate) pixel_format: PixelFormat,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames read).
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("frame_interval", &self.frame_interval)
            .field("image_extension", &self.image_extension)
            .field("pixel_format", &self.pixel_format)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            pixel_format: PixelFormat::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Save every `interval`-th frame. Zero is rejected when extraction
    /// starts.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: u64) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the extension of saved frames. A leading dot is ignored and the
    /// value is lower-cased.
    #[must_use]
    pub fn with_image_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.image_extension = extension
            .as_ref()
            .trim_start_matches('.')
            .to_ascii_lowercase();
        self
    }

    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Attach a progress callback, invoked every
    /// [`batch_size`](ExtractOptions::with_batch_size) frames read.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token. Cancelling it stops the loop before the
    /// next read; the summary reports the run as interrupted.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn frame_interval(&self) -> u64 {
        self.frame_interval
    }

    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Reject settings extraction cannot run with and resolve the encoder.
    pub(crate) fn validate(&self) -> Result<ImageFormat, FramedumpError> {
        if self.frame_interval == 0 {
            return Err(FramedumpError::InvalidInterval);
        }
        ImageFormat::from_extension(&self.image_extension)
            .filter(|format| format.writing_enabled())
            .ok_or_else(|| FramedumpError::UnsupportedImageFormat(self.image_extension.clone()))
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
