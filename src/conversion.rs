//! Conversion from scaled FFmpeg frames to [`image::DynamicImage`].

use ffmpeg_next::frame::Video as VideoFrame;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::{config::PixelFormat, error::FramedumpError};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg frames often carry per-row padding (stride > width x bpp); this
/// strips it so the result can go straight into an `ImageBuffer`.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Build an image from a frame already scaled into `pixel_format`.
pub(crate) fn frame_to_image(
    scaled_frame: &VideoFrame,
    pixel_format: PixelFormat,
) -> Result<DynamicImage, FramedumpError> {
    let width = scaled_frame.width();
    let height = scaled_frame.height();
    let buffer = frame_to_buffer(scaled_frame, width, height, pixel_format.bytes_per_pixel());

    let image = match pixel_format {
        PixelFormat::Rgb8 => RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8),
        PixelFormat::Rgba8 => {
            RgbaImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgba8)
        }
        PixelFormat::Gray8 => {
            GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
        }
    };

    image.ok_or_else(|| {
        FramedumpError::VideoDecodeError(format!(
            "Failed to construct {pixel_format:?} image from decoded frame data"
        ))
    })
}
