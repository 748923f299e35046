//! Integration tests against an in-process mock of the OCR backend

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use url::Url;

use pdf_ocr_client::{
    models::{OcrResult, PageResult, UploadFile},
    presenter::MemoryClipboard,
    services::{OcrClient, UploadEvent, UploadOutcome},
    App, AppError, Config,
};

#[derive(Clone)]
enum MockReply {
    Json(StatusCode, Value),
    Raw(StatusCode, String),
}

#[derive(Debug, Clone, PartialEq)]
struct ReceivedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    size: usize,
}

#[derive(Clone)]
struct MockBackend {
    pdf_hits: Arc<AtomicUsize>,
    image_hits: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedFile>>>,
    reply: Arc<Mutex<MockReply>>,
    health_status: Arc<Mutex<String>>,
    delay: Duration,
}

impl MockBackend {
    fn replying(reply: MockReply) -> Self {
        Self {
            pdf_hits: Arc::new(AtomicUsize::new(0)),
            image_hits: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(reply)),
            health_status: Arc::new(Mutex::new("healthy".to_string())),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn hits(&self) -> (usize, usize) {
        (
            self.pdf_hits.load(Ordering::SeqCst),
            self.image_hits.load(Ordering::SeqCst),
        )
    }

    async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/upload-pdf", post(upload_pdf))
            .route("/api/upload-image", post(upload_image))
            .route("/api/health", get(health))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }
}

async fn upload_pdf(State(backend): State<MockBackend>, multipart: Multipart) -> Response {
    backend.pdf_hits.fetch_add(1, Ordering::SeqCst);
    answer_upload(backend, multipart).await
}

async fn upload_image(State(backend): State<MockBackend>, multipart: Multipart) -> Response {
    backend.image_hits.fetch_add(1, Ordering::SeqCst);
    answer_upload(backend, multipart).await
}

async fn answer_upload(backend: MockBackend, mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap();
        backend.received.lock().unwrap().push(ReceivedFile {
            file_name,
            content_type,
            size: data.len(),
        });
    }

    if !backend.delay.is_zero() {
        tokio::time::sleep(backend.delay).await;
    }

    let reply = backend.reply.lock().unwrap().clone();
    match reply {
        MockReply::Json(status, body) => (status, Json(body)).into_response(),
        MockReply::Raw(status, body) => (status, body).into_response(),
    }
}

async fn health(State(backend): State<MockBackend>) -> Json<Value> {
    let status = backend.health_status.lock().unwrap().clone();
    Json(json!({ "status": status, "service": "PDF OCR API" }))
}

fn two_page_result() -> OcrResult {
    OcrResult::from_pages(
        "a.pdf",
        vec![
            PageResult::new(1, "one two three four five"),
            PageResult::new(2, "six seven eight nine ten"),
        ],
    )
}

fn ok_reply(result: &OcrResult) -> MockReply {
    MockReply::Json(StatusCode::OK, serde_json::to_value(result).unwrap())
}

fn client_for(base_url: &str, timeout: Duration) -> OcrClient {
    OcrClient::new(&Url::parse(base_url).unwrap(), timeout).unwrap()
}

fn app_for(base_url: &str, timeout: Duration) -> App {
    let config = Config {
        api_url: base_url.to_string(),
        ..Config::default()
    };
    App::new(
        config,
        client_for(base_url, timeout),
        Box::new(MemoryClipboard::default()),
    )
}

fn pdf_file() -> UploadFile {
    UploadFile::new("a.pdf", b"%PDF-1.7 fake".to_vec())
}

#[tokio::test]
async fn test_pdf_routes_to_document_endpoint() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let result = client.submit(&pdf_file()).await.unwrap();

    assert_eq!(result, two_page_result());
    assert_eq!(backend.hits(), (1, 0));
}

#[tokio::test]
async fn test_images_route_to_image_endpoint() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let names = ["scan.png", "photo.jpg", "photo.jpeg", "old.bmp", "fax.tiff", "anim.gif"];
    for name in names {
        client
            .submit(&UploadFile::new(name, vec![1u8, 2, 3]))
            .await
            .unwrap();
    }

    assert_eq!(backend.hits(), (0, names.len()));
}

#[tokio::test]
async fn test_multipart_carries_name_and_type() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    client.submit(&pdf_file()).await.unwrap();

    let received = backend.received.lock().unwrap().clone();
    assert_eq!(
        received,
        vec![ReceivedFile {
            file_name: Some("a.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            size: 13,
        }]
    );
}

#[tokio::test]
async fn test_image_shaped_response_is_normalized() {
    let body = json!({
        "success": true,
        "filename": "scan.png",
        "text": "Hello there",
        "word_count": 2,
        "character_count": 11
    });
    let backend = MockBackend::replying(MockReply::Json(StatusCode::OK, body));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let result = client
        .submit(&UploadFile::new("scan.png", vec![0u8; 4]))
        .await
        .unwrap();

    assert_eq!(result.filename, "scan.png");
    assert_eq!(result.full_text, "Hello there");
    assert_eq!(result.total_words, 2);
    assert_eq!(result.total_characters, 11);
    assert_eq!(result.total_pages, None);
    assert_eq!(result.page_count(), 1);
}

#[tokio::test]
async fn test_success_false_is_processing_failure() {
    let backend = MockBackend::replying(MockReply::Json(
        StatusCode::OK,
        json!({ "success": false, "detail": "Could not extract images from PDF" }),
    ));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let err = client.submit(&pdf_file()).await.unwrap_err();
    match err {
        AppError::ProcessingFailed { detail } => {
            assert_eq!(detail.as_deref(), Some("Could not extract images from PDF"))
        }
        other => panic!("Expected ProcessingFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_success_without_detail_uses_generic_message() {
    let backend = MockBackend::replying(MockReply::Json(
        StatusCode::OK,
        json!({ "filename": "a.pdf", "full_text": "text" }),
    ));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let err = client.submit(&pdf_file()).await.unwrap_err();
    assert!(matches!(err, AppError::ProcessingFailed { detail: None }));
    assert_eq!(err.to_string(), "OCR processing failed");
}

#[tokio::test]
async fn test_non_object_bodies_are_invalid_responses() {
    let bodies = vec![
        MockReply::Json(StatusCode::OK, json!([1, 2, 3])),
        MockReply::Json(StatusCode::OK, json!("done")),
        MockReply::Raw(StatusCode::OK, "<html>proxy page</html>".to_string()),
    ];

    for reply in bodies {
        let backend = MockBackend::replying(reply);
        let base = backend.spawn().await;
        let client = client_for(&base, Duration::from_secs(5));

        let err = client.submit(&pdf_file()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidResponse), "got {:?}", err);
        assert_eq!(err.to_string(), "Invalid response format from server");
    }
}

#[tokio::test]
async fn test_error_status_prefers_server_detail() {
    let backend = MockBackend::replying(MockReply::Json(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": "Error processing PDF: broken xref" }),
    ));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let err = client.submit(&pdf_file()).await.unwrap_err();
    assert!(matches!(err, AppError::TransportError { .. }));
    assert_eq!(
        err.to_string(),
        "OCR processing failed: Error processing PDF: broken xref"
    );
}

#[tokio::test]
async fn test_error_status_without_detail_reports_status() {
    let backend = MockBackend::replying(MockReply::Raw(
        StatusCode::BAD_GATEWAY,
        "upstream down".to_string(),
    ));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    let err = client.submit(&pdf_file()).await.unwrap_err();
    assert!(matches!(err, AppError::TransportError { .. }));
    assert!(err.to_string().contains("502"), "got {}", err);
}

#[tokio::test]
async fn test_two_page_pdf_scenario() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    app.submit_file(pdf_file()).unwrap();
    assert!(matches!(
        app.controller().outcome(),
        UploadOutcome::InFlight { .. }
    ));
    assert!(app.controller().render_intake().contains("Processing your file..."));

    let event = app.wait_for_settlement().await.unwrap();
    assert!(matches!(event, UploadEvent::Succeeded(_)));
    assert!(app.error().is_none());

    let screen = app.render();
    assert!(screen.contains("a.pdf"));
    assert!(screen.contains("2 pages"));
    assert!(screen.contains("10 words"));
    let page_one = screen.find("Page 1").unwrap();
    let page_two = screen.find("Page 2").unwrap();
    assert!(page_one < page_two);
}

#[tokio::test]
async fn test_unsupported_file_never_dispatches() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain text").unwrap();

    let err = app.submit(&[path]).await.unwrap_err();
    assert!(matches!(err, AppError::UnsupportedFile { .. }));
    assert!(err.is_rejected_before_dispatch());
    assert_eq!(app.controller().outcome(), &UploadOutcome::Idle);
    assert!(app.error().is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.hits(), (0, 0));
}

#[tokio::test]
async fn test_only_first_file_of_a_drop_is_uploaded() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("a.pdf");
    let png = dir.path().join("b.png");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();
    std::fs::write(&png, b"\x89PNG").unwrap();

    app.submit(&[pdf, png]).await.unwrap();
    app.wait_for_settlement().await.unwrap();

    assert_eq!(backend.hits(), (1, 0));
}

#[tokio::test]
async fn test_second_submission_while_in_flight_is_rejected() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()))
        .with_delay(Duration::from_millis(300));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    app.submit_file(pdf_file()).unwrap();
    let err = app
        .submit_file(UploadFile::new("b.png", vec![0u8; 8]))
        .unwrap_err();
    assert!(matches!(err, AppError::Busy));
    assert!(matches!(app.reset(), Err(AppError::Busy)));

    app.wait_for_settlement().await.unwrap();
    assert_eq!(backend.hits(), (1, 0));
    assert_eq!(app.result().map(|r| r.filename.as_str()), Some("a.pdf"));
}

#[tokio::test]
async fn test_timeout_settles_as_failure() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()))
        .with_delay(Duration::from_secs(3));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_millis(300));

    app.submit_file(pdf_file()).unwrap();
    let event = app.wait_for_settlement().await.unwrap();

    match event {
        UploadEvent::Failed(message) => assert!(message.contains("timed out"), "got {}", message),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(app.result().is_none());
    assert!(app.error().unwrap().contains("timed out"));
    assert!(matches!(app.controller().outcome(), UploadOutcome::Failed(_)));
}

#[tokio::test]
async fn test_failure_replaces_prior_result_and_new_upload_clears_error() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    app.submit_file(pdf_file()).unwrap();
    app.wait_for_settlement().await.unwrap();
    assert!(app.result().is_some());

    *backend.reply.lock().unwrap() = MockReply::Json(
        StatusCode::OK,
        json!({ "success": false, "detail": "Only PDF files are allowed" }),
    );
    app.submit_file(pdf_file()).unwrap();
    assert!(app.result().is_none());
    app.wait_for_settlement().await.unwrap();
    assert!(app.result().is_none());
    assert_eq!(app.error(), Some("Only PDF files are allowed"));

    *backend.reply.lock().unwrap() = ok_reply(&two_page_result());
    app.submit_file(pdf_file()).unwrap();
    assert!(app.error().is_none());
    app.wait_for_settlement().await.unwrap();
    assert!(app.result().is_some());
    assert!(app.error().is_none());
}

#[tokio::test]
async fn test_reset_after_settlement_is_idle_and_idempotent() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    app.submit_file(pdf_file()).unwrap();
    app.wait_for_settlement().await.unwrap();
    app.reset().unwrap();
    app.reset().unwrap();
    assert_eq!(app.controller().outcome(), &UploadOutcome::Idle);
    assert!(app.result().is_none());
    assert!(app.error().is_none());

    *backend.reply.lock().unwrap() =
        MockReply::Json(StatusCode::OK, json!({ "success": false }));
    app.submit_file(pdf_file()).unwrap();
    app.wait_for_settlement().await.unwrap();
    assert!(app.error().is_some());
    app.reset().unwrap();
    assert_eq!(app.controller().outcome(), &UploadOutcome::Idle);
    assert!(app.result().is_none());
    assert!(app.error().is_none());
}

#[tokio::test]
async fn test_dismiss_error_keeps_result_slot_empty() {
    let backend = MockBackend::replying(MockReply::Json(
        StatusCode::OK,
        json!({ "success": false }),
    ));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    app.submit_file(pdf_file()).unwrap();
    app.wait_for_settlement().await.unwrap();
    assert!(app.render().contains("OCR processing failed"));

    app.dismiss_error();
    assert!(app.error().is_none());
    assert!(app.result().is_none());
    assert!(!app.render().contains("OCR processing failed"));
}

#[tokio::test]
async fn test_health_check() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let client = client_for(&base, Duration::from_secs(5));

    assert!(client.check_health().await);

    *backend.health_status.lock().unwrap() = "degraded".to_string();
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn test_health_check_unreachable_is_false() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}/api", addr), Duration::from_secs(2));
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn test_download_after_upload() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));
    let dir = tempfile::tempdir().unwrap();

    assert!(app.download(Some(dir.path())).await.is_err());

    app.submit_file(pdf_file()).unwrap();
    app.wait_for_settlement().await.unwrap();

    let path = app.download(Some(dir.path())).await.unwrap();
    assert_eq!(path, dir.path().join("a_extracted_text.txt"));
    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, two_page_result().full_text);
}

#[tokio::test]
async fn test_session_runs_commands_and_waits_for_upload() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()))
        .with_delay(Duration::from_millis(100));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    let dir = tempfile::tempdir().unwrap();
    let pdf: PathBuf = dir.path().join("a.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();

    let script = format!("help\nopen {}\n", pdf.display());
    let mut output: Vec<u8> = Vec::new();
    app.run(script.as_bytes(), &mut output).await.unwrap();

    let transcript = String::from_utf8(output).unwrap();
    assert!(transcript.contains("PDF OCR Tool"));
    assert!(transcript.contains("Commands:"));
    assert!(transcript.contains("Processing your file..."));
    assert!(transcript.contains("Extraction Results"));
    assert!(transcript.contains("10 words"));
    assert_eq!(backend.hits(), (1, 0));
}

#[tokio::test]
async fn test_session_opens_quoted_path_with_spaces() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    let dir = tempfile::tempdir().unwrap();
    let pdf: PathBuf = dir.path().join("My Scan.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();

    let script = format!("open '{}'\n", pdf.display());
    let mut output: Vec<u8> = Vec::new();
    app.run(script.as_bytes(), &mut output).await.unwrap();

    let transcript = String::from_utf8(output).unwrap();
    assert!(transcript.contains("Extraction Results"));
    assert_eq!(backend.hits(), (1, 0));
    let received = backend.received.lock().unwrap().clone();
    assert_eq!(received[0].file_name.as_deref(), Some("My Scan.pdf"));
}

#[tokio::test]
async fn test_session_quit_stops_reading() {
    let backend = MockBackend::replying(ok_reply(&two_page_result()));
    let base = backend.spawn().await;
    let mut app = app_for(&base, Duration::from_secs(5));

    let mut output: Vec<u8> = Vec::new();
    app.run(&b"quit\nopen a.pdf\n"[..], &mut output).await.unwrap();

    assert_eq!(backend.hits(), (0, 0));
    assert_eq!(app.controller().outcome(), &UploadOutcome::Idle);
}
