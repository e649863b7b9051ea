//! RunConfig, ExtractOptions, and error classification tests.

use std::path::PathBuf;

use framedump::{
    DEFAULT_FRAME_INTERVAL, ErrorCategory, ExtractOptions, FramedumpError, PixelFormat, RunConfig,
};

// ── RunConfig ──────────────────────────────────────────────────────

#[test]
fn run_config_defaults() {
    let config = RunConfig::new("Videos/My Project/Zoom.mp4");
    assert_eq!(config.video_path, PathBuf::from("Videos/My Project/Zoom.mp4"));
    assert_eq!(config.frame_interval, DEFAULT_FRAME_INTERVAL);
    assert_eq!(config.frame_interval, 10);
    assert_eq!(config.runs_dir, PathBuf::from("runs"));
    assert_eq!(config.image_extension, "png");
    assert_eq!(config.pixel_format, PixelFormat::Rgb8);
}

#[test]
fn run_config_builders() {
    let config = RunConfig::new("clip.mp4")
        .with_frame_interval(25)
        .with_runs_dir("/tmp/out")
        .with_image_extension("jpg")
        .with_pixel_format(PixelFormat::Gray8);

    assert_eq!(config.frame_interval, 25);
    assert_eq!(config.runs_dir, PathBuf::from("/tmp/out"));
    assert_eq!(config.image_extension, "jpg");
    assert_eq!(config.pixel_format, PixelFormat::Gray8);
}

#[test]
fn run_config_carries_settings_into_options() {
    let options = RunConfig::new("clip.mp4")
        .with_frame_interval(4)
        .with_image_extension(".TIFF")
        .with_pixel_format(PixelFormat::Rgba8)
        .extract_options();

    assert_eq!(options.frame_interval(), 4);
    assert_eq!(options.image_extension(), "tiff");
    assert_eq!(options.pixel_format(), PixelFormat::Rgba8);
}

// ── ExtractOptions ─────────────────────────────────────────────────

#[test]
fn options_defaults() {
    let options = ExtractOptions::new();
    assert_eq!(options.frame_interval(), 10);
    assert_eq!(options.image_extension(), "png");
    assert_eq!(options.pixel_format(), PixelFormat::Rgb8);

    let debug = format!("{options:?}");
    assert!(debug.contains("ExtractOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn options_batch_size_clamps_zero() {
    let debug = format!("{:?}", ExtractOptions::new().with_batch_size(0));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn options_extension_is_normalised() {
    assert_eq!(
        ExtractOptions::new().with_image_extension(".JPG").image_extension(),
        "jpg"
    );
}

// ── ErrorCategory ──────────────────────────────────────────────────

#[test]
fn setup_errors_are_classified() {
    let errors = [
        FramedumpError::VideoNotFound {
            path: PathBuf::from("missing.mp4"),
        },
        FramedumpError::CreateDirectory {
            path: PathBuf::from("/root/denied"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        },
        FramedumpError::FileOpen {
            path: PathBuf::from("bad.mp4"),
            reason: "Invalid data found when processing input".to_string(),
        },
        FramedumpError::NoVideoStream,
        FramedumpError::InvalidInterval,
        FramedumpError::UnsupportedImageFormat("xyz".to_string()),
    ];
    for error in errors {
        assert_eq!(error.category(), ErrorCategory::Setup, "{error}");
    }
}

#[test]
fn loop_errors_are_classified() {
    assert_eq!(
        FramedumpError::Interrupted.category(),
        ErrorCategory::Interrupted
    );
    assert_eq!(
        FramedumpError::VideoDecodeError("bad packet".to_string()).category(),
        ErrorCategory::Unexpected
    );
    assert_eq!(
        FramedumpError::from(std::io::Error::other("disk gone")).category(),
        ErrorCategory::Unexpected
    );
}

#[test]
fn error_messages_name_the_problem() {
    let error = FramedumpError::VideoNotFound {
        path: PathBuf::from("Videos/Zoom.mp4"),
    };
    assert_eq!(
        error.to_string(),
        "Video file 'Videos/Zoom.mp4' does not exist"
    );
    assert_eq!(
        FramedumpError::InvalidInterval.to_string(),
        "Frame interval must be greater than zero"
    );
}
