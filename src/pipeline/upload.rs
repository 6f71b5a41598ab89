//! Backend submission: multipart POST, raw JSON back.
//!
//! This is the only stage with network I/O. It does not interpret the
//! response beyond "is it JSON"; shape reconciliation is
//! [`crate::pipeline::normalize`]'s job. There is no retry loop: one
//! request, one outcome.

use crate::config::ClientConfig;
use crate::error::{StudyError, UploadError};
use crate::request::{ProcessingMode, SubmissionRequest};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest error body kept in [`UploadError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// The as-received backend response body.
///
/// Untrusted and shape-unknown: any JSON value at all, including `null` or a
/// bare array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Value);

impl RawPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Anything that can carry a [`SubmissionRequest`] to a backend.
///
/// [`UploadClient`] is the HTTP implementation; the orchestrator is generic
/// over this trait so it can be driven by an in-process fake.
pub trait UploadBackend: Send + Sync {
    fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> impl Future<Output = Result<RawPayload, UploadError>> + Send;
}

/// HTTP client for the submission endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
    timeout_secs: Option<u64>,
    mode: Option<ProcessingMode>,
}

impl UploadClient {
    /// Build a client from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, StudyError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| StudyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.upload_url(),
            timeout_secs: config.timeout_secs,
            mode: config.mode,
        })
    }

    /// Full URL requests are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Encode the request as `multipart/form-data`.
    ///
    /// Fields: `file` (bytes, with file name and content type), `audience`,
    /// `purpose`, and `mode` when one is configured.
    fn build_form(&self, request: &SubmissionRequest) -> Result<Form, UploadError> {
        let file = Part::bytes(request.file_bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(request.content_type())
            .map_err(|e| UploadError::Encode(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("audience", request.audience.as_str())
            .text("purpose", request.purpose.as_str());
        if let Some(mode) = self.mode {
            form = form.text("mode", mode.as_str());
        }
        Ok(form)
    }

    fn transport_error(&self, e: reqwest::Error) -> UploadError {
        match (e.is_timeout(), self.timeout_secs) {
            (true, Some(secs)) => UploadError::Timeout {
                endpoint: self.endpoint.clone(),
                secs,
            },
            _ => UploadError::Transport {
                endpoint: self.endpoint.clone(),
                source: e,
            },
        }
    }

    /// POST the request and return the parsed body.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<RawPayload, UploadError> {
        info!(
            "Uploading '{}' ({} bytes, audience={}, purpose={}) to {}",
            request.file_name,
            request.file_bytes.len(),
            request.audience,
            request.purpose,
            self.endpoint
        );

        let form = self.build_form(request)?;
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!("Backend answered HTTP {} with {} bytes", status, body.len());

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let body: String = text.chars().take(MAX_ERROR_BODY).collect();
            warn!("Upload rejected: HTTP {}", status);
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        RawPayload::from_slice(&body).map_err(|source| {
            warn!("Backend body is not JSON: {}", source);
            UploadError::MalformedBody { source }
        })
    }
}

impl UploadBackend for UploadClient {
    fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> impl Future<Output = Result<RawPayload, UploadError>> + Send {
        UploadClient::submit(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_payload_parses_any_json() {
        assert_eq!(RawPayload::from_slice(b"null").unwrap(), RawPayload::default());
        let p = RawPayload::from_slice(br#"{"summary":"x"}"#).unwrap();
        assert_eq!(p.as_value(), &json!({"summary": "x"}));
        assert!(RawPayload::from_slice(b"<html>").is_err());
    }

    #[test]
    fn raw_payload_is_transparent() {
        let p = RawPayload::from(json!([1, 2]));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1,2]");
        assert_eq!(p.into_value(), json!([1, 2]));
    }

    #[test]
    fn client_uses_configured_endpoint() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9/")
            .build()
            .unwrap();
        let client = UploadClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/upload");
    }

    #[test]
    fn form_builds_for_known_and_unknown_extensions() {
        let client = UploadClient::new(&ClientConfig::default()).unwrap();
        let req = SubmissionRequest::new(
            vec![1, 2, 3],
            "deck.pptx",
            crate::Audience::Novice,
            crate::Purpose::Exam,
        );
        assert!(client.build_form(&req).is_ok());
        let req = SubmissionRequest::new(vec![1], "notes", crate::Audience::Novice, crate::Purpose::Exam);
        assert!(client.build_form(&req).is_ok());
    }
}
