//! Sequential frame sources.
//!
//! [`FrameSource`] is the seam between the extraction loop and whatever
//! produces frames. [`VideoSource`] is the FFmpeg-backed implementation: it
//! owns the demuxer and decoder for one file, hands out frames strictly in
//! decode order, and releases everything when dropped.
//!
//! # Example
//!
//! ```no_run
//! use framedump::{FrameSource, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let mut index = 0;
//! while let Some(frame) = source.read_frame()? {
//!     if index % 100 == 0 {
//!         frame.save(format!("frame_{index:06}.png"))?;
//!     }
//!     index += 1;
//! }
//! # Ok::<(), framedump::FramedumpError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder, format::context::Input, frame::Video as VideoFrame,
    media::Type, software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::DynamicImage;

use crate::{
    config::PixelFormat, conversion::frame_to_image, error::FramedumpError,
    metadata::VideoMetadata,
};

/// Consecutive demuxer read failures tolerated before giving up on a file.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// A finite, ordered, non-restartable producer of decoded frames.
pub trait FrameSource {
    /// Decode the next frame.
    ///
    /// `Ok(None)` marks the end of the stream. Once it has been returned,
    /// further calls keep returning `Ok(None)`.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FramedumpError>;

    /// Number of frames the source expects to produce, if known.
    fn total_frames(&self) -> Option<u64> {
        None
    }

    /// Nominal frame rate, if known.
    fn frames_per_second(&self) -> Option<f64> {
        None
    }
}

/// FFmpeg-backed [`FrameSource`] bound to one video file.
///
/// Reads packets from the best video stream, decodes them, and converts each
/// frame to a [`DynamicImage`] in the configured [`PixelFormat`]. The file
/// handle and codec state are freed when the source is dropped.
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    /// Built from the first decoded frame, since some codecs only report
    /// their pixel format once decoding has started.
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    metadata: VideoMetadata,
    pixel_format: PixelFormat,
    path: PathBuf,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("pixel_format", &self.pixel_format)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for sequential decoding.
    ///
    /// Initialises FFmpeg (idempotent), opens the container, picks the best
    /// video stream, and probes its [`VideoMetadata`].
    ///
    /// # Errors
    ///
    /// - [`FramedumpError::FileOpen`] if the container or decoder cannot be
    ///   opened.
    /// - [`FramedumpError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramedumpError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video source: {}", path.display());

        let open_error = |reason: String| FramedumpError::FileOpen {
            path: path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramedumpError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 && frame_rate.numerator() > 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 && rate.numerator() > 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        // Prefer the muxer's count; it is exact when present.
        let reported_frames = stream.frames();
        let frame_count = if reported_frames > 0 {
            reported_frames as u64
        } else if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            duration,
            format: input_context.format().name().to_string(),
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.2} fps, ~{} frames [{}]",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            metadata,
            pixel_format: PixelFormat::default(),
            path,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Convert decoded frames to `pixel_format` instead of RGB8.
    #[must_use]
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self.scaler = None;
        self
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scale the current `decoded_frame` and convert it to an image.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, FramedumpError> {
        let scaler = match self.scaler.take() {
            Some(scaler) => scaler,
            None => ScalingContext::get(
                self.decoded_frame.format(),
                self.decoded_frame.width(),
                self.decoded_frame.height(),
                self.pixel_format.to_ffmpeg_pixel(),
                self.decoded_frame.width(),
                self.decoded_frame.height(),
                ScalingFlags::BILINEAR,
            )?,
        };
        let scaler = self.scaler.insert(scaler);

        scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;
        frame_to_image(&self.scaled_frame, self.pixel_format)
    }
}

impl FrameSource for VideoSource {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FramedumpError> {
        if self.done {
            return Ok(None);
        }

        let mut consecutive_read_errors = 0;

        loop {
            // Drain anything the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return match self.convert_current_frame() {
                    Ok(image) => Ok(Some(image)),
                    Err(error) => {
                        self.done = true;
                        Err(error)
                    }
                };
            }

            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    consecutive_read_errors = 0;
                    if packet.stream() == self.video_stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            self.done = true;
                            return Err(FramedumpError::VideoDecodeError(error.to_string()));
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Err(FramedumpError::from(error));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    consecutive_read_errors += 1;
                    log::debug!("Skipping unreadable packet in {}: {error}", self.path.display());
                    if consecutive_read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        self.done = true;
                        return Err(FramedumpError::VideoDecodeError(format!(
                            "{consecutive_read_errors} consecutive packet read failures, last: {error}"
                        )));
                    }
                }
            }
        }
    }

    fn total_frames(&self) -> Option<u64> {
        self.metadata.total_frames()
    }

    fn frames_per_second(&self) -> Option<f64> {
        (self.metadata.frames_per_second > 0.0).then_some(self.metadata.frames_per_second)
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        log::debug!("Releasing video source: {}", self.path.display());
    }
}
