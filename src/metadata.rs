//! Video metadata types.
//!
//! [`VideoMetadata`] is probed once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for its lifetime.

use std::time::Duration;

use crate::config::DEFAULT_FRAMES_PER_SECOND;

/// Metadata for the video stream being decoded.
///
/// # Example
///
/// ```no_run
/// use framedump::VideoSource;
///
/// let source = VideoSource::open("input.mp4").unwrap();
/// let metadata = source.metadata();
/// println!("{}x{} [{}]", metadata.width, metadata.height, metadata.codec);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate, or `0.0` when the container does not report one.
    pub frames_per_second: f64,
    /// Frame count reported by the stream, or estimated from duration and
    /// frame rate. `0` when neither is available.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container duration.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// The reported frame count, or `None` when it is unknown.
    pub fn total_frames(&self) -> Option<u64> {
        (self.frame_count > 0).then_some(self.frame_count)
    }

    /// The frame rate, falling back to 30 when the container reports none.
    pub fn frames_per_second_or_default(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            self.frames_per_second
        } else {
            DEFAULT_FRAMES_PER_SECOND
        }
    }
}
