// Each test binary only uses part of this module.
#![allow(unused)]

use std::{
    fs,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use framedump::{
    CancellationToken, FrameSource, FramedumpError, ProgressCallback, ProgressInfo,
};
use image::{DynamicImage, Rgb, RgbImage};

pub const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// In-memory [`FrameSource`] producing `frame_count` tiny frames.
pub struct SyntheticSource {
    frame_count: u64,
    next: u64,
    reported_total: Option<u64>,
    fail_at: Option<u64>,
    cancel_at: Option<(u64, CancellationToken)>,
    released: Arc<AtomicBool>,
}

impl SyntheticSource {
    pub fn new(frame_count: u64) -> Self {
        Self {
            frame_count,
            next: 0,
            reported_total: Some(frame_count),
            fail_at: None,
            cancel_at: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report `total` instead of the real frame count.
    pub fn reporting_total(mut self, total: Option<u64>) -> Self {
        self.reported_total = total;
        self
    }

    /// Return a decode error instead of frame `index`.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Cancel `token` right after handing out frame `index`.
    pub fn cancelling_after(mut self, index: u64, token: CancellationToken) -> Self {
        self.cancel_at = Some((index, token));
        self
    }

    /// Flag set once the source has been dropped.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FramedumpError> {
        if self.fail_at == Some(self.next) {
            return Err(FramedumpError::VideoDecodeError(format!(
                "corrupt packet at frame {}",
                self.next
            )));
        }
        if self.next >= self.frame_count {
            return Ok(None);
        }

        let shade = (self.next % 256) as u8;
        let image = RgbImage::from_pixel(4, 3, Rgb([shade, 255 - shade, 128]));

        if let Some((index, token)) = &self.cancel_at {
            if *index == self.next {
                token.cancel();
            }
        }

        self.next += 1;
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }

    fn total_frames(&self) -> Option<u64> {
        self.reported_total
    }

    fn frames_per_second(&self) -> Option<f64> {
        Some(25.0)
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Records every progress snapshot it receives.
#[derive(Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<ProgressInfo>>,
    pub finished: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.updates.lock().unwrap().push(info.clone());
    }

    fn on_finish(&self, info: &ProgressInfo) {
        self.finished.lock().unwrap().push(info.clone());
    }
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
