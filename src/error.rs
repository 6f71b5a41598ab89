//! Error types for the lecture-study library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`StudyError`] — **Fatal**: the operation cannot start at all (bad
//!   configuration, unreadable input file, HTTP client could not be built).
//!   Returned as `Err(StudyError)` from constructors and file helpers.
//!
//! * [`UploadError`] — **Per-submission**: one round trip to the backend
//!   failed. It is never thrown past the orchestrator; instead it is stored in
//!   [`crate::orchestrator::SubmissionState::Failed`] so the consumer can show
//!   it and the next submission starts from a clean slate.
//!
//! Missing fields in a backend payload and unprintable bytes in a fallback
//! buffer are *not* errors anywhere in this crate; those degrade to empty
//! values.

use std::path::PathBuf;
use thiserror::Error;

/// Single user-facing notice for every upload failure.
///
/// The variants of [`UploadError`] keep the precise cause for logs and
/// programmatic inspection; the notice stays coarse for display.
pub const UPLOAD_FAILURE_NOTICE: &str =
    "The summary request failed. Check that the backend is running and see its logs.";

/// All fatal errors returned by the lecture-study library.
#[derive(Debug, Error)]
pub enum StudyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Lecture file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value that should be one of a closed set was something else.
    #[error("Invalid {field} '{value}': expected one of {expected}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Upload errors ─────────────────────────────────────────────────────
    /// A submission failed and the caller asked for it as a hard error.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// A failed round trip to the submission endpoint.
///
/// Every variant is a transport-level failure in the sense of the upload
/// contract: the backend could not be reached, answered with a non-2xx status,
/// or sent a body that is not JSON. None of them is retried.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Connection refused, DNS failure, TLS error, reset mid-body, …
    #[error("Request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The configured timeout elapsed before the backend answered.
    #[error("Request to '{endpoint}' timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    /// The backend answered with a non-success status code.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the body is not valid JSON.
    #[error("Backend response is not valid JSON: {source}")]
    MalformedBody {
        #[source]
        source: serde_json::Error,
    },

    /// The multipart form could not be assembled (bad content type).
    #[error("Could not encode upload form: {0}")]
    Encode(String),
}

impl UploadError {
    /// The coarse message a UI should display for any upload failure.
    pub fn notice(&self) -> &'static str {
        UPLOAD_FAILURE_NOTICE
    }

    /// `true` when the backend was reached and produced a response.
    pub fn reached_backend(&self) -> bool {
        matches!(self, UploadError::Status { .. } | UploadError::MalformedBody { .. })
    }

    /// HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Status { status, .. } => Some(*status),
            UploadError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
