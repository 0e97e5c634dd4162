//! Remote processing gateway.
//!
//! The backend exposes five fixed endpoints:
//!
//! ```text
//! GET  /health                 → {status}
//! POST /detect-document-type   {text}                  → {document_type, confidence?}
//! POST /enhance-text           {text, document_type?}  → {enhanced_text, document_type?}
//! POST /ocr-image              multipart "file"        → {text, confidence?}
//! POST /process-file           multipart "file"        → {text, document_type, enhanced_text, confidence?}
//! ```
//!
//! [`ProcessingBackend`] is the seam: [`HttpGateway`] is the real thing,
//! and a session can be handed any other implementation through
//! [`crate::config::GatewayConfigBuilder::backend`].
//!
//! 1. [`types`]: health status and the document-type hint
//! 2. [`wire`] : request/response bodies and their conversion into results
//! 3. [`http`] : the `reqwest` implementation

pub mod http;
pub mod types;
mod wire;

pub use http::HttpGateway;
pub use types::{health_label, DocumentTypeHint, HealthStatus};

use crate::config::GatewayConfig;
use crate::error::MeddocError;
use crate::intake::AcceptedFile;
use crate::result::ProcessingResult;
use async_trait::async_trait;
use std::sync::Arc;

/// The five backend operations.
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// Never fails: any failure is reported as [`HealthStatus::Error`].
    async fn health(&self) -> HealthStatus;

    /// Fails with [`MeddocError::EmptyInput`] on blank text, before any request.
    async fn detect_type(&self, text: &str) -> Result<ProcessingResult, MeddocError>;

    /// `hint = AutoDetect` leaves the type to the backend.
    async fn enhance_text(
        &self,
        text: &str,
        hint: DocumentTypeHint,
    ) -> Result<ProcessingResult, MeddocError>;

    /// Fails with [`MeddocError::NotAnImage`] for non-image files, before any request.
    async fn ocr_image(&self, file: &AcceptedFile) -> Result<ProcessingResult, MeddocError>;

    /// Combined OCR + detection + enhancement for images, PDFs, and DOCX.
    async fn process_file(&self, file: &AcceptedFile) -> Result<ProcessingResult, MeddocError>;
}

/// Blank or whitespace-only text is a caller error.
pub fn require_text(text: &str, operation: &'static str) -> Result<(), MeddocError> {
    if text.trim().is_empty() {
        return Err(MeddocError::EmptyInput { operation });
    }
    Ok(())
}

/// OCR only takes images.
pub fn require_image(file: &AcceptedFile) -> Result<(), MeddocError> {
    if !file.mime_type().starts_with("image/") {
        return Err(MeddocError::NotAnImage {
            mime_type: file.mime_type().to_string(),
        });
    }
    Ok(())
}

/// Resolve the backend from config: a pre-built one wins over `base_url`.
pub fn resolve_backend(config: &GatewayConfig) -> Result<Arc<dyn ProcessingBackend>, MeddocError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    Ok(Arc::new(HttpGateway::new(config.normalised_base_url())?))
}
