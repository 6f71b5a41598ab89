//! HTTP integration tests against an in-process multipart server.
//!
//! Each test binds an axum app to `127.0.0.1:0`, points an `UploadClient` at
//! it, and checks both what the client sent and how the reply was mapped.
//!
//! Run with:
//!   cargo test --test upload -- --nocapture

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use lecture_study::{
    Audience, ClientConfig, Origin, ProcessingMode, Purpose, RawPayload, StudyError,
    SubmissionOrchestrator, SubmissionRequest, SubmitOutcome, Term, UploadClient, UploadError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test server ──────────────────────────────────────────────────────────────

/// One multipart request as the server saw it.
#[derive(Debug, Default, Clone)]
struct Captured {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
    fields: HashMap<String, String>,
}

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<Captured>>>,
}

async fn upload(State(reply): State<Reply>, mut multipart: Multipart) -> Response {
    let mut captured = Captured::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            captured.file_name = field.file_name().map(str::to_string);
            captured.content_type = field.content_type().map(str::to_string);
            captured.bytes = field.bytes().await.unwrap().to_vec();
        } else {
            let text = field.text().await.unwrap();
            captured.fields.insert(name, text);
        }
    }
    reply.seen.lock().unwrap().push(captured);

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body.clone(),
    )
        .into_response()
}

struct TestServer {
    base_url: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl TestServer {
    async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    async fn start_with_delay(status: StatusCode, body: impl Into<String>, delay: Duration) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reply = Reply {
            status,
            body: body.into(),
            delay,
            seen: Arc::clone(&seen),
        };
        let app = Router::new().route("/upload", post(upload)).with_state(reply);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::builder().base_url(&self.base_url).build().unwrap()
    }

    fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

fn lecture(name: &str) -> SubmissionRequest {
    SubmissionRequest::new(b"%PDF-1.7 lecture".to_vec(), name, Audience::Intermediate, Purpose::Exam)
}

/// Caller-side helper that treats any upload failure as fatal.
async fn submit_or_fail(client: &UploadClient, request: &SubmissionRequest) -> Result<RawPayload, StudyError> {
    Ok(client.submit(request).await?)
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn sends_file_and_preferences_as_multipart() {
    let server = TestServer::start(StatusCode::OK, "{}").await;
    let client = UploadClient::new(&server.config()).unwrap();

    client.submit(&lecture("week5.pdf")).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.file_name.as_deref(), Some("week5.pdf"));
    assert_eq!(sent.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(sent.bytes, b"%PDF-1.7 lecture");
    assert_eq!(sent.fields.get("audience").map(String::as_str), Some("intermediate"));
    assert_eq!(sent.fields.get("purpose").map(String::as_str), Some("exam"));
    assert!(!sent.fields.contains_key("mode"), "mode is only sent when configured");
}

#[tokio::test]
async fn sends_mode_when_configured() {
    let server = TestServer::start(StatusCode::OK, "{}").await;
    let config = ClientConfig::builder()
        .base_url(&server.base_url)
        .mode(ProcessingMode::DocaiThenGemini)
        .build()
        .unwrap();
    let client = UploadClient::new(&config).unwrap();

    client.submit(&lecture("deck.pptx")).await.unwrap();

    let sent = &server.requests()[0];
    assert_eq!(sent.fields.get("mode").map(String::as_str), Some("docai_then_gemini"));
    assert_eq!(
        sent.content_type.as_deref(),
        Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
    );
}

// ── Response mapping ─────────────────────────────────────────────────────────

#[tokio::test]
async fn returns_raw_json_untouched() {
    let body = json!({"result": {"glossary": [{"term": "A"}]}, "extra": 1});
    let server = TestServer::start(StatusCode::OK, body.to_string()).await;
    let client = UploadClient::new(&server.config()).unwrap();

    let payload = client.submit(&lecture("a.pdf")).await.unwrap();
    assert_eq!(payload.as_value(), &body);
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let server = TestServer::start(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let client = UploadClient::new(&server.config()).unwrap();

    let err = client.submit(&lecture("a.pdf")).await.unwrap_err();
    match err {
        UploadError::Status { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert!(err.reached_backend());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = TestServer::start(StatusCode::OK, "<html>proxy error</html>").await;
    let client = UploadClient::new(&server.config()).unwrap();

    let err = client.submit(&lecture("a.pdf")).await.unwrap_err();
    assert!(matches!(err, UploadError::MalformedBody { .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Reserve a port, then free it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();
    let client = UploadClient::new(&config).unwrap();

    let err = client.submit(&lecture("a.pdf")).await.unwrap_err();
    assert!(matches!(err, UploadError::Transport { .. }), "got {err:?}");
    assert!(!err.reached_backend());
}

#[tokio::test]
async fn slow_backend_hits_configured_timeout() {
    let server =
        TestServer::start_with_delay(StatusCode::OK, "{}", Duration::from_secs(5)).await;
    let config = ClientConfig::builder()
        .base_url(&server.base_url)
        .timeout_secs(1)
        .build()
        .unwrap();
    let client = UploadClient::new(&config).unwrap();

    let err = client.submit(&lecture("a.pdf")).await.unwrap_err();
    assert!(matches!(err, UploadError::Timeout { secs: 1, .. }), "got {err:?}");
}

#[tokio::test]
async fn upload_error_converts_into_study_error() {
    let server = TestServer::start(StatusCode::BAD_GATEWAY, "").await;
    let client = UploadClient::new(&server.config()).unwrap();

    let err = submit_or_fail(&client, &lecture("a.pdf")).await.unwrap_err();
    assert!(matches!(err, StudyError::Upload(UploadError::Status { status: 502, .. })));
}

// ── Orchestrator over HTTP ───────────────────────────────────────────────────

#[tokio::test]
async fn orchestrator_normalises_legacy_nested_reply() {
    let body = json!({
        "result": {
            "summary": {"high_level": "Recursion", "sections": [{"title": "Base case", "bullets": ["stop"]}]},
            "glossary": [{"term": "Stack frame", "definition": "per-call storage"}],
            "questions": [{"type": "short", "stem": "What is a base case?"}],
            "counts": {"glossary": 1, "questions": 1}
        }
    });
    let server = TestServer::start(StatusCode::OK, body.to_string()).await;
    let orch = SubmissionOrchestrator::from_config(&server.config()).unwrap();

    let outcome = orch.submit(lecture("recursion.pdf")).await;
    let SubmitOutcome::Succeeded { seq, material } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(seq, 1);
    assert_eq!(material.origin, Origin::Backend);
    assert_eq!(material.summary.as_ref().unwrap().high_level, "Recursion");
    assert_eq!(material.terms[0].term, "Stack frame");
    assert_eq!(material.questions[0].stem, "What is a base case?");
    assert_eq!(material.counts.get("glossary"), Some(&1));
}

#[tokio::test]
async fn orchestrator_normalises_flat_reply() {
    let body = json!({
        "summary": "One-line overview",
        "terms": [{"term": "Heap"}],
        "questions": []
    });
    let server = TestServer::start(StatusCode::OK, body.to_string()).await;
    let orch = SubmissionOrchestrator::from_config(&server.config()).unwrap();

    let outcome = orch.submit(lecture("heaps.pdf")).await;
    let SubmitOutcome::Succeeded { material, .. } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(material.terms, vec![Term::new("Heap")]);
    let summary = material.summary.as_ref().unwrap();
    assert_eq!(summary.high_level, "One-line overview");
    assert!(summary.sections.is_empty());
}

#[tokio::test]
async fn orchestrator_publishes_failure_and_recovers() {
    let server = TestServer::start(StatusCode::SERVICE_UNAVAILABLE, "down").await;
    let orch = SubmissionOrchestrator::from_config(&server.config()).unwrap();

    let outcome = orch.submit(lecture("a.pdf")).await;
    assert!(matches!(outcome, SubmitOutcome::Failed { seq: 1, .. }));
    let state = orch.state();
    let error = state.error().expect("failed state");
    assert_eq!(error.status(), Some(503));
    assert_eq!(error.notice(), lecture_study::UPLOAD_FAILURE_NOTICE);

    // The offline path still works with the backend down.
    let outcome = orch.submit_offline(lecture("a.pdf"));
    assert!(matches!(outcome, SubmitOutcome::Succeeded { seq: 2, .. }));
    assert!(orch.state().error().is_none());
    assert_eq!(server.requests().len(), 1, "offline mode must not hit the backend");
}

#[tokio::test]
async fn empty_file_never_reaches_backend() {
    let server = TestServer::start(StatusCode::OK, "{}").await;
    let orch = SubmissionOrchestrator::from_config(&server.config()).unwrap();

    let empty = SubmissionRequest::new(Vec::new(), "", Audience::Novice, Purpose::Understanding);
    assert!(matches!(orch.submit(empty).await, SubmitOutcome::Ignored));
    assert!(server.requests().is_empty());
}
