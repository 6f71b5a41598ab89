//! Fallback extraction: raw bytes → bounded printable-ASCII excerpt.
//!
//! This is not a document parser. It keeps every byte that is printable
//! ASCII (32–126) or a line break (LF, CR), drops everything else, and stops
//! at [`EXCERPT_LIMIT`] characters. For a PDF that means content-stream
//! operators and dictionary keys come through alongside any uncompressed
//! text, which is good enough to seed a local summary when no backend is
//! reachable.

use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Maximum number of characters in an extracted excerpt.
pub const EXCERPT_LIMIT: usize = 2000;

/// Output of [`extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// At most [`EXCERPT_LIMIT`] characters, all ASCII.
    pub text: String,
    /// `true` iff the buffer held more than [`EXCERPT_LIMIT`] retained bytes.
    pub truncated: bool,
}

#[inline]
fn is_retained(byte: u8) -> bool {
    matches!(byte, 32..=126 | b'\n' | b'\r')
}

/// Extract a bounded plain-text excerpt from an arbitrary buffer.
///
/// Total and deterministic. Every retained byte is ASCII, so byte count and
/// character count agree.
pub fn extract(buffer: &[u8]) -> ExtractionResult {
    let mut text = String::with_capacity(buffer.len().min(EXCERPT_LIMIT));
    let mut truncated = false;

    for &byte in buffer.iter().filter(|&&b| is_retained(b)) {
        if text.len() == EXCERPT_LIMIT {
            truncated = true;
            break;
        }
        text.push(byte as char);
    }

    debug!(
        "Extracted {} chars from {} bytes (truncated: {})",
        text.len(),
        buffer.len(),
        truncated
    );
    ExtractionResult { text, truncated }
}

/// Read a file without blocking the runtime and run [`extract`] over it.
pub async fn extract_file(path: impl AsRef<Path>) -> Result<ExtractionResult, StudyError> {
    let bytes = crate::pipeline::input::read_file(path.as_ref()).await?;
    Ok(extract(&bytes))
}
