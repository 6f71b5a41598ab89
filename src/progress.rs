//! Progress-callback trait for submission events.
//!
//! Inject an [`Arc<dyn SubmissionProgressCallback>`] via
//! [`crate::orchestrator::SubmissionOrchestrator::with_progress`] to receive
//! events as each submission moves through its lifecycle. The same
//! transitions are also published on the orchestrator's watch channel; the
//! callback is the push-style alternative for hosts that want hooks (a
//! terminal spinner, a log line, a metrics counter) rather than a receiver.
//!
//! # Example
//!
//! ```rust
//! use lecture_study::SubmissionProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountingCallback {
//!     failures: AtomicUsize,
//! }
//!
//! impl SubmissionProgressCallback for CountingCallback {
//!     fn on_failure(&self, seq: u64, error: &lecture_study::UploadError) {
//!         self.failures.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("submission #{seq} failed: {error}");
//!     }
//! }
//! ```

use crate::error::UploadError;
use crate::material::StudyMaterial;
use std::sync::Arc;

/// Called by the orchestrator as submissions progress.
///
/// Implementations must be `Send + Sync`: overlapping submissions may
/// complete on different tasks. All methods have default no-op
/// implementations so callers only override what they care about.
///
/// `seq` is the dispatch sequence number; it increases by one for every
/// submission (online or offline) that passes the has-a-file guard.
pub trait SubmissionProgressCallback: Send + Sync {
    /// Called when a submission is dispatched.
    fn on_submit_start(&self, seq: u64, file_name: &str) {
        let _ = (seq, file_name);
    }

    /// Called when a submission was ignored because no file was chosen.
    fn on_ignored(&self) {}

    /// Called when a submission's material has been published.
    fn on_success(&self, seq: u64, material: &StudyMaterial) {
        let _ = (seq, material);
    }

    /// Called when a submission's failure has been published.
    fn on_failure(&self, seq: u64, error: &UploadError) {
        let _ = (seq, error);
    }

    /// Called when a submission completed after a newer one was dispatched;
    /// its outcome was discarded.
    ///
    /// # Arguments
    /// * `seq`    — the stale submission
    /// * `latest` — the newest dispatched submission at completion time
    fn on_superseded(&self, seq: u64, latest: u64) {
        let _ = (seq, latest);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SubmissionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the orchestrator.
pub type ProgressCallback = Arc<dyn SubmissionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        successes: AtomicUsize,
        failures: AtomicUsize,
        superseded: Mutex<Vec<(u64, u64)>>,
    }

    impl SubmissionProgressCallback for TrackingCallback {
        fn on_submit_start(&self, _seq: u64, _file_name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_success(&self, _seq: u64, _material: &StudyMaterial) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_failure(&self, _seq: u64, _error: &UploadError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_superseded(&self, seq: u64, latest: u64) {
            self.superseded.lock().unwrap().push((seq, latest));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_submit_start(1, "deck.pdf");
        cb.on_ignored();
        cb.on_success(1, &StudyMaterial::default());
        cb.on_failure(2, &UploadError::Encode("x".into()));
        cb.on_superseded(1, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_submit_start(1, "a.pdf");
        tracker.on_submit_start(2, "b.pdf");
        tracker.on_superseded(1, 2);
        tracker.on_success(2, &StudyMaterial::default());

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.successes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 0);
        assert_eq!(*tracker.superseded.lock().unwrap(), vec![(1, 2)]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_submit_start(7, "x.pdf");
        cb.on_success(7, &StudyMaterial::default());
    }
}
