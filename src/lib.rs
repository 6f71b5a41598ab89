//! # lecture-study
//!
//! Submit lecture documents (PDF or slide decks) to a study-material service
//! and get back one normalised [`StudyMaterial`]: a summary, a glossary and
//! a question set.
//!
//! ## Why this crate?
//!
//! The service has answered in more than one shape over time: a `result`
//! wrapper with a `glossary` list, or a flat object with `terms`. Consumers
//! should not care. This crate reconciles every shape in one pure function,
//! guards against out-of-order completions when a user submits twice, and
//! keeps a local fallback that pulls readable text straight out of the file
//! bytes when the service is not an option.
//!
//! ## Pipeline Overview
//!
//! ```text
//! lecture file
//!  │
//!  ├─ 1. Input      read bytes + file name, pick audience / purpose
//!  ├─ 2. Upload     multipart POST to {base_url}/upload
//!  ├─ 3. Normalise  nested | flat | opaque  →  StudyMaterial
//!  └─ 4. Publish    watch channel, stale completions dropped
//!
//! offline: bytes → printable excerpt (≤ 2000 chars) → rule-based summary
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lecture_study::{
//!     request_from_path, Audience, ClientConfig, Purpose, SubmissionOrchestrator,
//!     SubmitOutcome,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!     let orchestrator = SubmissionOrchestrator::from_config(&config)?;
//!
//!     let request = request_from_path("week3.pdf", Audience::Novice, Purpose::Exam).await?;
//!     match orchestrator.submit(request).await {
//!         SubmitOutcome::Succeeded { material, .. } => {
//!             println!("{} terms, {} questions", material.terms.len(), material.questions.len());
//!         }
//!         SubmitOutcome::Failed { error, .. } => eprintln!("{}", error.notice()),
//!         _ => {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `study` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lecture-study = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod material;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_UPLOAD_PATH};
pub use error::{StudyError, UploadError, UPLOAD_FAILURE_NOTICE};
pub use material::{DocumentMeta, Origin, Question, QuestionKind, Section, StudyMaterial, Summary, Term};
pub use orchestrator::{SubmissionOrchestrator, SubmissionState, SubmitOutcome};
pub use pipeline::extract::{extract, extract_file, ExtractionResult, EXCERPT_LIMIT};
pub use pipeline::input::{read_file, request_from_path};
pub use pipeline::normalize::{normalize, normalize_value};
pub use pipeline::synthesize::{ExcerptSynthesizer, SummarySynthesizer};
pub use pipeline::upload::{RawPayload, UploadBackend, UploadClient};
pub use progress::{NoopProgressCallback, ProgressCallback, SubmissionProgressCallback};
pub use request::{Audience, ProcessingMode, Purpose, SubmissionRequest};
