//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] observes long-running work, [`CancellationToken`]
//! stops it cooperatively, and [`ProgressInfo`] is the snapshot handed to
//! callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use repframe::{ExtractOptions, MediaFile, ProgressCallback, ProgressInfo, ThumbnailError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {} frames retained", info.operation, info.current);
//!     }
//! }
//!
//! let mut media = MediaFile::open("input.mp4")?;
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! let buffer = media.representative_frame_with_options(&options)?;
//! # Ok::<(), ThumbnailError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding and retaining candidate frames from one stream.
    FrameAcquisition,
    /// Thumbnailing a list of candidate files.
    CandidateBatch,
}

/// A snapshot of progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled by
/// [`ExtractOptions::with_batch_size`](crate::ExtractOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items (frames / candidates) have been processed so far.
    pub current: u64,
    /// Upper bound on the number of items, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because candidate batches
/// may report from worker threads.
///
/// Callbacks observe but cannot halt the operation. Use
/// [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during an operation.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and call [`cancel`](CancellationToken::cancel) from any
/// thread. Frame acquisition checks it once per packet read.
///
/// # Example
///
/// ```
/// use repframe::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts finished items and forwards a [`ProgressInfo`] to the callback
/// whenever the count reaches the next multiple of the batch size.
pub(crate) struct ProgressReporter {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    done: u64,
    step: u64,
    next_report_at: u64,
    started: Instant,
}

impl ProgressReporter {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        let step = batch_size.max(1);
        Self {
            callback,
            operation,
            total,
            done: 0,
            step,
            next_report_at: step,
            started: Instant::now(),
        }
    }

    /// One more item finished.
    pub(crate) fn advance(&mut self) {
        self.done += 1;
        if self.done >= self.next_report_at {
            self.emit();
            self.next_report_at = self.done + self.step;
        }
    }

    /// Emit the closing report. Always fires, even right after a batch report.
    pub(crate) fn finish(self) {
        self.emit();
    }

    fn emit(&self) {
        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.done,
            total: self.total,
            percentage: percent_of(self.done, self.total),
            elapsed: self.started.elapsed(),
        });
    }
}

fn percent_of(done: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(total) if total > 0 => Some(done as f32 * 100.0 / total as f32),
        _ => None,
    }
}
