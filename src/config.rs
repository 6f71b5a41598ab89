//! Configuration for talking to the submission backend.
//!
//! Everything the [`crate::pipeline::upload::UploadClient`] needs to know is
//! in [`ClientConfig`], built via its [`ClientConfigBuilder`]. The library
//! never reads environment variables itself; where the backend lives is the
//! caller's decision (the `study` binary maps `STUDY_API_URL` onto
//! [`ClientConfigBuilder::base_url`]).

use crate::error::StudyError;
use crate::request::ProcessingMode;
use serde::{Deserialize, Serialize};

/// Default backend address for a locally running service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Path of the submission endpoint relative to the base URL.
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

/// Configuration for the upload client.
///
/// # Example
/// ```rust
/// use lecture_study::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://10.0.0.5:8080")
///     .timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.upload_url(), "http://10.0.0.5:8080/upload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ optional port / prefix) of the backend. Default: `http://localhost:8080`.
    pub base_url: String,

    /// Endpoint path appended to `base_url`. Default: `/upload`.
    pub upload_path: String,

    /// Whole-request timeout in seconds. Default: none.
    ///
    /// Summarising a long deck takes the backend minutes, so no timeout is
    /// imposed unless the caller asks for one.
    pub timeout_secs: Option<u64>,

    /// Processing mode forwarded as the `mode` form field. Default: not sent.
    pub mode: Option<ProcessingMode>,

    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            timeout_secs: None,
            mode: None,
            user_agent: concat!("lecture-study/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the submission endpoint.
    pub fn upload_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.upload_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().to_string();
        self
    }

    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.config.upload_path = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, StudyError> {
        let c = &self.config;
        if !is_http_url(&c.base_url) {
            return Err(StudyError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.timeout_secs == Some(0) {
            return Err(StudyError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_http_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
