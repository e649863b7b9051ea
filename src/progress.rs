//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] receives a [`ProgressInfo`] snapshot as frames are
//! read; [`CancellationToken`] lets another thread (typically a Ctrl-C
//! handler) ask a running extraction to stop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framedump::{ExtractOptions, FramedumpError, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% complete");
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! let summary = framedump::extract_frames("input.mp4", "frames", &options)?;
//! # Ok::<(), FramedumpError>(())
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames read so far.
    pub current: u64,
    /// Frames expected, if the container reports a count.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since extraction started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Index of the frame that triggered this report.
    pub current_frame: Option<u64>,
}

/// Receives progress updates during extraction.
///
/// Callbacks observe but cannot halt the loop. Use [`CancellationToken`]
/// for that.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames read.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once when the loop exits, however it exited.
    fn on_finish(&self, _info: &ProgressInfo) {}
}

/// Discards all notifications. The default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state; cancelling one cancels all of them.
///
/// ```
/// use framedump::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.clone().cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing and fires the callback every `batch_size` frames.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    /// A `total` of zero is treated as unknown.
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>, batch_size: u64) -> Self {
        Self {
            callback,
            total: total.filter(|&t| t > 0),
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one frame read and fire the callback if the batch threshold
    /// is reached.
    pub(crate) fn advance(&mut self, frame_index: u64) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            let info = self.snapshot(Some(frame_index));
            self.callback.on_progress(&info);
            self.items_since_last_report = 0;
        }
    }

    /// Emit the final report.
    pub(crate) fn finish(&self) {
        let info = self.snapshot(None);
        self.callback.on_finish(&info);
    }

    fn snapshot(&self, frame_index: Option<u64>) -> ProgressInfo {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        }
    }
}
