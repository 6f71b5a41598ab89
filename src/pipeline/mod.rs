//! Pipeline stages for turning a lecture file into study material.
//!
//! Each submodule implements exactly one step. The online path and the
//! offline path share only the input stage; everything after it is
//! independent so either can be tested without the other.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──▶ upload ──▶ normalize ──┐
//! input ─────┤  (multipart)  (3 shapes)  ├──▶ StudyMaterial
//! (path)     └──▶ extract ──▶ synthesize ┘
//!                 (printable)  (rule-based)
//! ```
//!
//! 1. [`input`]     — read a local file into a [`crate::SubmissionRequest`]
//! 2. [`upload`]    — POST the request to the backend; the only stage with
//!    network I/O
//! 3. [`normalize`] — reconcile nested, flat and opaque payloads into one
//!    shape; pure
//! 4. [`extract`]   — keep printable ASCII from raw bytes, capped at
//!    [`extract::EXCERPT_LIMIT`]
//! 5. [`synthesize`] — turn an excerpt into minimal material for offline mode

pub mod extract;
pub mod input;
pub mod normalize;
pub mod synthesize;
pub mod upload;
