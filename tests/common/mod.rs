//! In-process stand-in for the processing backend.
//!
//! Serves the five endpoints on `127.0.0.1:0` and records every request it
//! receives so tests can assert on the exact payloads.

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One request as seen by the backend.
#[derive(Debug, Clone)]
pub enum Recorded {
    Health,
    Json { path: &'static str, body: Value },
    Upload { path: &'static str, field: String, file_name: Option<String>, content_type: Option<String>, len: usize },
}

#[derive(Clone, Default)]
pub struct Backend {
    log: Arc<Mutex<Vec<Recorded>>>,
    health_status: Arc<Mutex<String>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn set_health(&self, status: &str) {
        *self.health_status.lock().unwrap() = status.to_string();
    }

    fn record(&self, r: Recorded) {
        self.log.lock().unwrap().push(r);
    }
}

/// Start the backend; returns its base URL and a handle on its request log.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    backend.set_health("ok");

    let app = Router::new()
        .route("/health", get(health))
        .route("/detect-document-type", post(detect))
        .route("/enhance-text", post(enhance))
        .route("/ocr-image", post(ocr))
        .route("/process-file", post(process))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn health(State(b): State<Backend>) -> Json<Value> {
    b.record(Recorded::Health);
    let status = b.health_status.lock().unwrap().clone();
    Json(json!({ "status": status }))
}

/// `boom` in the text makes the model fail; `weird` returns an invalid confidence.
async fn detect(State(b): State<Backend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    b.record(Recorded::Json { path: "/detect-document-type", body });
    if text.contains("boom") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Model unavailable" })),
        );
    }
    if text.contains("weird") {
        return (StatusCode::OK, Json(json!({ "document_type": "other", "confidence": 1.7 })));
    }
    (
        StatusCode::OK,
        Json(json!({ "document_type": "prescription", "confidence": 0.92 })),
    )
}

async fn enhance(State(b): State<Backend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let doc_type = body
        .get("document_type")
        .and_then(Value::as_str)
        .unwrap_or("clinical_note")
        .to_string();
    b.record(Recorded::Json { path: "/enhance-text", body });
    (
        StatusCode::OK,
        Json(json!({
            "enhanced_text": "## Assessment\n\nPatient is **stable**.",
            "document_type": doc_type,
        })),
    )
}

async fn read_upload(b: &Backend, path: &'static str, mut multipart: Multipart) -> Option<String> {
    let mut content_type = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        content_type = field.content_type().map(str::to_owned);
        let len = field.bytes().await.unwrap().len();
        b.record(Recorded::Upload {
            path,
            field: name,
            file_name,
            content_type: content_type.clone(),
            len,
        });
    }
    content_type
}

async fn ocr(State(b): State<Backend>, multipart: Multipart) -> (StatusCode, Json<Value>) {
    let content_type = read_upload(&b, "/ocr-image", multipart).await;
    if !content_type.is_some_and(|c| c.starts_with("image/")) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Not an image" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "text": "Rx: Lisinopril 10mg\nOnce daily", "confidence": 0.88 })),
    )
}

async fn process(State(b): State<Backend>, multipart: Multipart) -> (StatusCode, Json<Value>) {
    read_upload(&b, "/process-file", multipart).await;
    (
        StatusCode::OK,
        Json(json!({
            "text": "HB 13.2 g/dL",
            "document_type": "lab_report",
            "enhanced_text": "- Hemoglobin: **13.2 g/dL** (normal)",
            "confidence": 0.75,
        })),
    )
}
