//! Extraction loop tests driven by an in-memory frame source.

mod common;

use std::{fs, sync::atomic::Ordering};

use common::{SyntheticSource, file_names};
use framedump::{
    CancellationToken, ErrorCategory, ExtractOptions, FramedumpError, StopReason,
    extract_from_source, frame_file_name, is_sampled,
};

fn expected_names(indices: &[u64]) -> Vec<String> {
    indices
        .iter()
        .map(|&index| frame_file_name(index, "png"))
        .collect()
}

#[test]
fn frame_file_name_is_zero_padded() {
    assert_eq!(frame_file_name(0, "png"), "frame_000000.png");
    assert_eq!(frame_file_name(42, "jpg"), "frame_000042.jpg");
    assert_eq!(frame_file_name(1_234_567, "png"), "frame_1234567.png");
}

#[test]
fn sampling_keeps_multiples_of_the_interval() {
    assert!(is_sampled(0, 10));
    assert!(!is_sampled(9, 10));
    assert!(is_sampled(20, 10));
    assert!(is_sampled(7, 1));
    assert!(!is_sampled(0, 0));
}

#[test]
fn twenty_five_frames_every_tenth() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(10);

    let summary = extract_from_source(SyntheticSource::new(25), output.path(), &options).unwrap();

    assert!(summary.stop_reason.is_end_of_stream());
    assert_eq!(summary.frames_processed, 25);
    assert_eq!(summary.frames_saved, 3);
    assert!(summary.write_failures.is_empty());
    assert_eq!(file_names(output.path()), expected_names(&[0, 10, 20]));
}

#[test]
fn saved_count_is_ceiling_of_frames_over_interval() {
    for (frames, interval) in [(1, 1), (9, 3), (10, 3), (100, 7), (31, 10)] {
        let output = tempfile::tempdir().expect("Failed to create temp dir");
        let options = ExtractOptions::new().with_frame_interval(interval);

        let summary =
            extract_from_source(SyntheticSource::new(frames), output.path(), &options).unwrap();

        assert_eq!(summary.frames_processed, frames);
        assert_eq!(
            summary.frames_saved,
            frames.div_ceil(interval),
            "frames={frames} interval={interval}"
        );
    }
}

#[test]
fn interval_of_one_saves_every_frame() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(1);

    let summary = extract_from_source(SyntheticSource::new(5), output.path(), &options).unwrap();

    assert_eq!(summary.frames_saved, 5);
    assert_eq!(file_names(output.path()), expected_names(&[0, 1, 2, 3, 4]));
}

#[test]
fn interval_longer_than_video_saves_first_frame_only() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(100);

    let summary = extract_from_source(SyntheticSource::new(12), output.path(), &options).unwrap();

    assert_eq!(summary.frames_processed, 12);
    assert_eq!(summary.frames_saved, 1);
    assert_eq!(file_names(output.path()), expected_names(&[0]));
}

#[test]
fn empty_source_saves_nothing() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let summary =
        extract_from_source(SyntheticSource::new(0), output.path(), &ExtractOptions::new())
            .unwrap();

    assert!(summary.stop_reason.is_end_of_stream());
    assert_eq!(summary.frames_processed, 0);
    assert_eq!(summary.frames_saved, 0);
    assert!(file_names(output.path()).is_empty());
}

#[test]
fn saved_frames_are_decodable_images() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(2);

    let _ = extract_from_source(SyntheticSource::new(3), output.path(), &options).unwrap();

    let image = image::open(output.path().join("frame_000002.png")).expect("Failed to decode");
    assert_eq!((image.width(), image.height()), (4, 3));
}

#[test]
fn other_image_extensions_are_honoured() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_frame_interval(2)
        .with_image_extension(".BMP");

    let summary = extract_from_source(SyntheticSource::new(4), output.path(), &options).unwrap();

    assert_eq!(summary.frames_saved, 2);
    assert_eq!(
        file_names(output.path()),
        vec!["frame_000000.bmp".to_string(), "frame_000002.bmp".to_string()]
    );
}

#[test]
fn write_failure_is_recorded_and_extraction_continues() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    // A directory squatting on the frame's file name makes the write fail.
    fs::create_dir(output.path().join("frame_000010.png")).unwrap();
    let options = ExtractOptions::new().with_frame_interval(10);

    let summary = extract_from_source(SyntheticSource::new(25), output.path(), &options).unwrap();

    assert!(summary.stop_reason.is_end_of_stream());
    assert_eq!(summary.frames_processed, 25);
    assert_eq!(summary.frames_saved, 2);
    assert_eq!(summary.write_failures.len(), 1);

    let failure = &summary.write_failures[0];
    assert_eq!(failure.frame_index, 10);
    assert_eq!(failure.path, output.path().join("frame_000010.png"));
    assert_eq!(failure.error.category(), ErrorCategory::FrameWrite);
    assert!(failure.error.to_string().contains("Error saving frame 10"));
    assert!(output.path().join("frame_000020.png").is_file());
}

#[test]
fn interruption_stops_the_loop_with_counters_intact() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let token = CancellationToken::new();
    let source = SyntheticSource::new(25).cancelling_after(12, token.clone());
    let options = ExtractOptions::new()
        .with_frame_interval(10)
        .with_cancellation(token);

    let summary = extract_from_source(source, output.path(), &options).unwrap();

    assert!(summary.stop_reason.is_interrupted());
    assert_eq!(summary.frames_processed, 13);
    assert_eq!(summary.frames_saved, 2);
    assert_eq!(file_names(output.path()), expected_names(&[0, 10]));
}

#[test]
fn already_cancelled_token_reads_nothing() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let token = CancellationToken::new();
    token.cancel();
    let options = ExtractOptions::new().with_cancellation(token);

    let summary = extract_from_source(SyntheticSource::new(25), output.path(), &options).unwrap();

    assert!(summary.stop_reason.is_interrupted());
    assert_eq!(summary.frames_processed, 0);
    assert!(file_names(output.path()).is_empty());
}

#[test]
fn source_failure_is_reported_in_summary() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(10);

    let summary = extract_from_source(
        SyntheticSource::new(25).failing_at(15),
        output.path(),
        &options,
    )
    .unwrap();

    assert_eq!(summary.frames_processed, 15);
    assert_eq!(summary.frames_saved, 2);
    match &summary.stop_reason {
        StopReason::Failed(error) => {
            assert_eq!(error.category(), ErrorCategory::Unexpected);
            assert!(error.to_string().contains("corrupt packet at frame 15"));
        }
        other => panic!("Expected Failed, got: {other}"),
    }
}

#[test]
fn source_is_released_however_the_loop_ends() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let source = SyntheticSource::new(3);
    let released = source.released_flag();
    let _ = extract_from_source(source, output.path(), &ExtractOptions::new()).unwrap();
    assert!(released.load(Ordering::SeqCst));

    let source = SyntheticSource::new(30).failing_at(4);
    let released = source.released_flag();
    let _ = extract_from_source(source, output.path(), &ExtractOptions::new()).unwrap();
    assert!(released.load(Ordering::SeqCst));

    let token = CancellationToken::new();
    let source = SyntheticSource::new(30).cancelling_after(1, token.clone());
    let released = source.released_flag();
    let options = ExtractOptions::new().with_cancellation(token);
    let _ = extract_from_source(source, output.path(), &options).unwrap();
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn rerun_overwrites_same_indices_and_keeps_stale_files() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_frame_interval(10);

    let first = extract_from_source(SyntheticSource::new(45), output.path(), &options).unwrap();
    assert_eq!(first.frames_saved, 5);

    let second = extract_from_source(SyntheticSource::new(25), output.path(), &options).unwrap();
    assert_eq!(second.frames_saved, 3);

    assert_eq!(
        file_names(output.path()),
        expected_names(&[0, 10, 20, 30, 40])
    );
}

#[test]
fn zero_interval_is_rejected_before_reading() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let source = SyntheticSource::new(5);
    let released = source.released_flag();
    let options = ExtractOptions::new().with_frame_interval(0);

    let result = extract_from_source(source, output.path(), &options);

    assert!(matches!(result, Err(FramedumpError::InvalidInterval)));
    assert!(released.load(Ordering::SeqCst));
    assert!(file_names(output.path()).is_empty());
}

#[test]
fn unknown_extension_is_rejected() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_image_extension("notanimage");

    let result = extract_from_source(SyntheticSource::new(5), output.path(), &options);

    match result {
        Err(FramedumpError::UnsupportedImageFormat(extension)) => {
            assert_eq!(extension, "notanimage");
        }
        other => panic!("Expected UnsupportedImageFormat, got: {other:?}"),
    }
}
