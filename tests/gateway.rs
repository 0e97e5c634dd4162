//! HTTP gateway tests against an in-process backend.
//!
//! Run with:
//!   cargo test --test gateway

mod common;

use common::{spawn_backend, unreachable_url, Recorded};
use meddoc::{
    health_label, render_result, validate, DocumentTypeHint, HealthStatus, HttpGateway,
    MeddocError, ProcessingBackend, ProcessingResult, SelectedFile, Style, ValidationPolicy,
};
use serde_json::json;

fn accepted(name: &str, mime: &str, len: usize) -> meddoc::AcceptedFile {
    let file = SelectedFile::from_bytes(name, mime, vec![7; len]);
    validate(&file, &ValidationPolicy::default()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(format!("{url}/")).unwrap();

    let status = gw.health().await;
    assert_eq!(status, HealthStatus::Ok);
    assert_eq!(health_label(Some(&status)), "Online");
    assert!(matches!(&backend.requests()[..], [Recorded::Health]));
}

#[tokio::test]
async fn health_passes_through_other_statuses() {
    let (url, backend) = spawn_backend().await;
    backend.set_health("degraded");
    let gw = HttpGateway::new(url).unwrap();
    assert_eq!(health_label(Some(&gw.health().await)), "degraded");

    backend.set_health("error");
    assert_eq!(gw.health().await, HealthStatus::Error);
}

#[tokio::test]
async fn health_against_unreachable_backend_is_error() {
    let gw = HttpGateway::new(unreachable_url().await).unwrap();
    let status = gw.health().await;
    assert_eq!(status, HealthStatus::Error);
    assert_eq!(health_label(Some(&status)), "Error");
}

#[tokio::test]
async fn detect_sends_text_and_returns_type() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let result = gw.detect_type("Amoxicillin 500mg tid").await.unwrap();
    assert_eq!(result.tag(), "text");
    assert_eq!(result.document_type(), Some("prescription"));
    assert_eq!(result.confidence().map(|c| c.percent()), Some(92));

    match &backend.requests()[..] {
        [Recorded::Json { path, body }] => {
            assert_eq!(*path, "/detect-document-type");
            assert_eq!(body, &json!({ "text": "Amoxicillin 500mg tid" }));
        }
        other => panic!("unexpected requests: {other:?}"),
    }
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let (url, _backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    match gw.detect_type("boom").await {
        Err(MeddocError::Remote(e)) => {
            assert_eq!(e.message, "Model unavailable");
            assert_eq!(e.status, Some(500));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn out_of_range_confidence_is_malformed() {
    let (url, _backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let err = gw.detect_type("weird scan").await.unwrap_err();
    assert!(err.to_string().starts_with("Malformed response"), "got {err}");
}

#[tokio::test]
async fn unreachable_backend_gives_unknown_error() {
    let gw = HttpGateway::new(unreachable_url().await).unwrap();
    let err = gw.detect_type("text").await.unwrap_err();
    assert_eq!(err.to_string(), "An unknown error occurred");
}

#[tokio::test]
async fn enhance_omits_auto_detect_hint() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    gw.enhance_text("bp 120/80", DocumentTypeHint::AutoDetect)
        .await
        .unwrap();
    let result = gw
        .enhance_text("wbc 11.2", DocumentTypeHint::LabReport)
        .await
        .unwrap();
    assert_eq!(result.document_type(), Some("lab_report"));

    let bodies: Vec<_> = backend
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            Recorded::Json { body, .. } => Some(body),
            _ => None,
        })
        .collect();
    assert_eq!(bodies[0], json!({ "text": "bp 120/80" }));
    assert!(bodies[0].get("document_type").is_none());
    assert_eq!(bodies[1], json!({ "text": "wbc 11.2", "document_type": "lab_report" }));
}

#[tokio::test]
async fn ocr_uploads_file_field() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let result = gw.ocr_image(&accepted("scan.png", "image/png", 2048)).await.unwrap();
    match &result {
        ProcessingResult::OcrResult { text, confidence } => {
            assert_eq!(text, "Rx: Lisinopril 10mg\nOnce daily");
            assert_eq!(confidence.map(|c| c.percent()), Some(88));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match &backend.requests()[..] {
        [Recorded::Upload { path, field, file_name, content_type, len }] => {
            assert_eq!(*path, "/ocr-image");
            assert_eq!(field, "file");
            assert_eq!(file_name.as_deref(), Some("scan.png"));
            assert_eq!(content_type.as_deref(), Some("image/png"));
            assert_eq!(*len, 2048);
        }
        other => panic!("unexpected requests: {other:?}"),
    }
}

#[tokio::test]
async fn ocr_rejects_pdf_before_upload() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let err = gw
        .ocr_image(&accepted("referral.pdf", "application/pdf", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, MeddocError::NotAnImage { .. }));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn process_pdf_returns_full_result() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let result = gw
        .process_file(&accepted("labs.pdf", "application/pdf", 4096))
        .await
        .unwrap();
    assert_eq!(result.tag(), "process");

    let out = render_result(Some(&result), Style::Plain);
    assert!(out.contains("[lab_report]  Confidence: 75%"), "got {out}");
    assert!(out.contains("HB 13.2 g/dL"));
    assert!(out.contains("• Hemoglobin: 13.2 g/dL (normal)"), "got {out}");

    match &backend.requests()[..] {
        [Recorded::Upload { path, field, .. }] => {
            assert_eq!(*path, "/process-file");
            assert_eq!(field, "file");
        }
        other => panic!("unexpected requests: {other:?}"),
    }
}

#[tokio::test]
async fn process_reads_file_from_disk() {
    let (url, backend) = spawn_backend().await;
    let gw = HttpGateway::new(url).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.docx");
    std::fs::write(&path, vec![0u8; 300]).unwrap();

    let file = SelectedFile::from_path(&path).unwrap();
    let accepted = validate(&file, &ValidationPolicy::default()).unwrap();
    gw.process_file(&accepted).await.unwrap();

    match &backend.requests()[..] {
        [Recorded::Upload { file_name, len, .. }] => {
            assert_eq!(file_name.as_deref(), Some("summary.docx"));
            assert_eq!(*len, 300);
        }
        other => panic!("unexpected requests: {other:?}"),
    }
}
