//! Submission orchestration: the state machine consumers observe.
//!
//! ```text
//!            submit (has file)
//!   Idle ─────────────────────▶ Submitting ──ok──▶ Succeeded
//!     ▲                          ▲      └──err──▶ Failed
//!     │ submit (no file): no-op  └──── submit (from any state)
//! ```
//!
//! Every dispatch is stamped with a sequence number. A completion is
//! published only if its number is still the latest dispatched; otherwise it
//! is reported as [`SubmitOutcome::Superseded`] and the state is left alone.
//! The counter bump and the state write share the watch channel's lock, so
//! the check cannot interleave with a newer dispatch.

use crate::config::ClientConfig;
use crate::error::{StudyError, UploadError};
use crate::material::StudyMaterial;
use crate::pipeline::extract::extract;
use crate::pipeline::normalize::normalize;
use crate::pipeline::synthesize::{ExcerptSynthesizer, SummarySynthesizer};
use crate::pipeline::upload::{UploadBackend, UploadClient};
use crate::progress::ProgressCallback;
use crate::request::SubmissionRequest;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// Published state of the orchestrator.
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Submission `seq` is in flight.
    Submitting { seq: u64 },
    /// Submission `seq` produced this material.
    Succeeded {
        seq: u64,
        material: Arc<StudyMaterial>,
    },
    /// Submission `seq` failed.
    Failed { seq: u64, error: Arc<UploadError> },
}

impl SubmissionState {
    /// Sequence number of the submission this state belongs to.
    pub fn seq(&self) -> Option<u64> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Submitting { seq }
            | SubmissionState::Succeeded { seq, .. }
            | SubmissionState::Failed { seq, .. } => Some(*seq),
        }
    }

    pub fn material(&self) -> Option<&Arc<StudyMaterial>> {
        match self {
            SubmissionState::Succeeded { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<UploadError>> {
        match self {
            SubmissionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }
}

/// What happened to one call to [`SubmissionOrchestrator::submit`].
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// No file was chosen; nothing was dispatched and the state is unchanged.
    Ignored,
    Succeeded {
        seq: u64,
        material: Arc<StudyMaterial>,
    },
    Failed {
        seq: u64,
        error: Arc<UploadError>,
    },
    /// Completed after submission `latest` was dispatched; discarded.
    Superseded { seq: u64, latest: u64 },
}

/// Coordinates upload, normalisation and the offline fallback, and publishes
/// the resulting [`SubmissionState`].
pub struct SubmissionOrchestrator<B = UploadClient> {
    backend: B,
    synthesizer: Arc<dyn SummarySynthesizer>,
    progress: Option<ProgressCallback>,
    dispatched: AtomicU64,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionOrchestrator<UploadClient> {
    /// Orchestrator over the HTTP [`UploadClient`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, StudyError> {
        Ok(Self::new(UploadClient::new(config)?))
    }
}

impl<B: UploadBackend> SubmissionOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            backend,
            synthesizer: Arc::new(ExcerptSynthesizer),
            progress: None,
            dispatched: AtomicU64::new(0),
            state,
        }
    }

    /// Receive lifecycle events through a callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Replace the synthesizer used by [`Self::submit_offline`].
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SummarySynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// The current state followed by every later change, as a stream.
    pub fn updates(&self) -> WatchStream<SubmissionState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Sequence number of the most recent dispatch (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Send `request` to the backend and publish the normalised result.
    ///
    /// Never retries and never falls back to offline extraction on failure.
    pub async fn submit(&self, request: SubmissionRequest) -> SubmitOutcome {
        let Some(seq) = self.dispatch(&request) else {
            return SubmitOutcome::Ignored;
        };
        let result = self
            .backend
            .submit(&request)
            .await
            .map(|payload| normalize(&payload));
        self.complete(seq, result)
    }

    /// Build material locally from the request bytes, without the backend.
    ///
    /// Runs the fallback extractor over the raw file and hands the excerpt to
    /// the configured [`SummarySynthesizer`]. Takes part in sequence
    /// numbering like an online submission, so it also supersedes any upload
    /// still in flight.
    pub fn submit_offline(&self, request: SubmissionRequest) -> SubmitOutcome {
        let Some(seq) = self.dispatch(&request) else {
            return SubmitOutcome::Ignored;
        };
        let excerpt = extract(&request.file_bytes);
        let material = self.synthesizer.synthesize(&excerpt, &request);
        self.complete(seq, Ok(material))
    }

    /// Guard + stamp + publish `Submitting`.
    fn dispatch(&self, request: &SubmissionRequest) -> Option<u64> {
        if !request.has_file() {
            debug!("Submit ignored: no file chosen");
            if let Some(ref cb) = self.progress {
                cb.on_ignored();
            }
            return None;
        }

        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.dispatched.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SubmissionState::Submitting { seq };
        });
        info!("Submission #{} dispatched: '{}'", seq, request.file_name);

        if let Some(ref cb) = self.progress {
            cb.on_submit_start(seq, &request.file_name);
        }
        Some(seq)
    }

    /// Publish a completion unless a newer submission has been dispatched.
    fn complete(&self, seq: u64, result: Result<StudyMaterial, UploadError>) -> SubmitOutcome {
        let result = result.map(Arc::new).map_err(Arc::new);
        let next = match &result {
            Ok(material) => SubmissionState::Succeeded {
                seq,
                material: Arc::clone(material),
            },
            Err(error) => SubmissionState::Failed {
                seq,
                error: Arc::clone(error),
            },
        };

        let mut latest = seq;
        let published = self.state.send_if_modified(|state| {
            latest = self.dispatched.load(Ordering::SeqCst);
            if latest != seq {
                return false;
            }
            *state = next;
            true
        });

        if !published {
            warn!(
                "Submission #{} completed after #{} was dispatched; result discarded",
                seq, latest
            );
            if let Some(ref cb) = self.progress {
                cb.on_superseded(seq, latest);
            }
            return SubmitOutcome::Superseded { seq, latest };
        }

        match result {
            Ok(material) => {
                info!(
                    "Submission #{} succeeded: {} terms, {} questions",
                    seq,
                    material.terms.len(),
                    material.questions.len()
                );
                if let Some(ref cb) = self.progress {
                    cb.on_success(seq, &material);
                }
                SubmitOutcome::Succeeded { seq, material }
            }
            Err(error) => {
                warn!("Submission #{} failed: {}", seq, error);
                if let Some(ref cb) = self.progress {
                    cb.on_failure(seq, &error);
                }
                SubmitOutcome::Failed { seq, error }
            }
        }
    }
}

impl<B: fmt::Debug> fmt::Debug for SubmissionOrchestrator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionOrchestrator")
            .field("backend", &self.backend)
            .field("synthesizer", &"<dyn SummarySynthesizer>")
            .field("progress", &self.progress.as_ref().map(|_| "<dyn SubmissionProgressCallback>"))
            .field("dispatched", &self.dispatched.load(Ordering::SeqCst))
            .field("state", &*self.state.borrow())
            .finish()
    }
}
