//! Input resolution: turn a local file path into a [`SubmissionRequest`].
//!
//! The bytes are read with `tokio::fs` so the caller's runtime is never
//! blocked on disk I/O. I/O failures are classified into the same
//! not-found / permission-denied buckets the CLI reports to the user.

use crate::error::StudyError;
use crate::request::{Audience, Purpose, SubmissionRequest};
use std::path::Path;
use tracing::debug;

/// Read a whole file, mapping I/O failures to [`StudyError`].
pub async fn read_file(path: &Path) -> Result<Vec<u8>, StudyError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StudyError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(StudyError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(StudyError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Build a request from a file on disk.
///
/// The file name sent to the backend is the last path component. An empty
/// file yields a request without a file, which the orchestrator ignores.
pub async fn request_from_path(
    path: impl AsRef<Path>,
    audience: Audience,
    purpose: Purpose,
) -> Result<SubmissionRequest, StudyError> {
    let path = path.as_ref();
    let bytes = read_file(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    Ok(SubmissionRequest::new(bytes, file_name, audience, purpose))
}
