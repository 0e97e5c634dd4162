//! HTTP implementation of [`ProcessingBackend`].
//!
//! One `reqwest::Client` is shared by all five operations. Every call is a
//! single request/response exchange: no retries and no timeout beyond the
//! transport defaults. Failures are logged once here and returned as
//! [`RemoteError`] so callers see one uniform error shape.

use super::types::{DocumentTypeHint, HealthStatus};
use super::wire::{
    DetectRequest, DetectResponse, EnhanceRequest, EnhanceResponse, HealthResponse, OcrResponse,
    ProcessResponse,
};
use super::{require_image, require_text, ProcessingBackend};
use crate::error::{MeddocError, RemoteError};
use crate::intake::AcceptedFile;
use crate::result::ProcessingResult;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Talks to the processing backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url` (trailing `/` ignored).
    pub fn new(base_url: impl Into<String>) -> Result<Self, MeddocError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("meddoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MeddocError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failure(path, e))?;
        decode(path, response).await
    }

    async fn post_file<R>(&self, path: &str, file: &AcceptedFile) -> Result<R, MeddocError>
    where
        R: DeserializeOwned,
    {
        let bytes = file.file().read_bytes().await?;
        debug!("POST {} ({}, {} bytes)", path, file.name(), bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| MeddocError::Internal(format!("Invalid MIME type '{}': {e}", file.mime_type())))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_failure(path, e))?;
        Ok(decode(path, response).await?)
    }
}

/// Turn a response into `R`, or into the uniform error on any failure.
async fn decode<R: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<R, RemoteError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_failure(path, e))?;

    if !status.is_success() {
        let err = RemoteError::from_body(status.as_u16(), &body);
        error!("API error on {} (HTTP {}): {}", path, status.as_u16(), err.message);
        return Err(err);
    }

    serde_json::from_str(&body).map_err(|e| {
        let err = RemoteError::malformed(e);
        error!("API error on {}: {}", path, err.message);
        err
    })
}

fn transport_failure(path: &str, e: reqwest::Error) -> RemoteError {
    warn!("Transport failure on {}: {}", path, e);
    let err = RemoteError::transport();
    error!("API error on {}: {}", path, err.message);
    err
}

#[async_trait]
impl ProcessingBackend for HttpGateway {
    async fn health(&self) -> HealthStatus {
        let response = match self.client.get(self.url("/health")).send().await {
            Ok(r) => r,
            Err(e) => {
                transport_failure("/health", e);
                return HealthStatus::Error;
            }
        };
        match decode::<HealthResponse>("/health", response).await {
            Ok(h) => {
                let status = HealthStatus::from_status(&h.status);
                info!("Backend health: {}", status.label());
                status
            }
            Err(_) => HealthStatus::Error,
        }
    }

    async fn detect_type(&self, text: &str) -> Result<ProcessingResult, MeddocError> {
        require_text(text, "detect the document type of")?;
        let r: DetectResponse = self
            .post_json("/detect-document-type", &DetectRequest { text })
            .await?;
        Ok(ProcessingResult::try_from(r)?)
    }

    async fn enhance_text(
        &self,
        text: &str,
        hint: DocumentTypeHint,
    ) -> Result<ProcessingResult, MeddocError> {
        require_text(text, "enhance")?;
        let body = EnhanceRequest {
            text,
            document_type: hint.to_request_field(),
        };
        let r: EnhanceResponse = self.post_json("/enhance-text", &body).await?;
        Ok(ProcessingResult::try_from(r)?)
    }

    async fn ocr_image(&self, file: &AcceptedFile) -> Result<ProcessingResult, MeddocError> {
        require_image(file)?;
        let r: OcrResponse = self.post_file("/ocr-image", file).await?;
        Ok(ProcessingResult::try_from(r)?)
    }

    async fn process_file(&self, file: &AcceptedFile) -> Result<ProcessingResult, MeddocError> {
        let r: ProcessResponse = self.post_file("/process-file", file).await?;
        Ok(ProcessingResult::try_from(r)?)
    }
}
