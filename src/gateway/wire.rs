//! JSON bodies exchanged with the backend, and their conversion into
//! [`ProcessingResult`].
//!
//! Responses are decoded into these loose structs first and only then turned
//! into typed results, so an out-of-range confidence is caught here, at the
//! boundary, rather than by whoever renders the result.

use crate::error::RemoteError;
use crate::result::{Confidence, ProcessingResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct DetectRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EnhanceRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    pub document_type: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceResponse {
    pub enhanced_text: String,
    #[serde(default)]
    pub document_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OcrResponse {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    pub text: String,
    pub document_type: String,
    pub enhanced_text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

fn confidence(raw: Option<f64>) -> Result<Option<Confidence>, RemoteError> {
    raw.map(|v| {
        Confidence::new(v)
            .ok_or_else(|| RemoteError::malformed(format!("confidence {v} is outside [0, 1]")))
    })
    .transpose()
}

impl TryFrom<DetectResponse> for ProcessingResult {
    type Error = RemoteError;

    fn try_from(r: DetectResponse) -> Result<Self, Self::Error> {
        Ok(ProcessingResult::TypeDetection {
            document_type: r.document_type,
            confidence: confidence(r.confidence)?,
        })
    }
}

impl TryFrom<EnhanceResponse> for ProcessingResult {
    type Error = RemoteError;

    fn try_from(r: EnhanceResponse) -> Result<Self, Self::Error> {
        Ok(ProcessingResult::TextEnhancement {
            enhanced_text: r.enhanced_text,
            document_type: r.document_type,
        })
    }
}

impl TryFrom<OcrResponse> for ProcessingResult {
    type Error = RemoteError;

    fn try_from(r: OcrResponse) -> Result<Self, Self::Error> {
        Ok(ProcessingResult::OcrResult {
            text: r.text,
            confidence: confidence(r.confidence)?,
        })
    }
}

impl TryFrom<ProcessResponse> for ProcessingResult {
    type Error = RemoteError;

    fn try_from(r: ProcessResponse) -> Result<Self, Self::Error> {
        Ok(ProcessingResult::FullProcess {
            text: r.text,
            document_type: r.document_type,
            enhanced_text: r.enhanced_text,
            confidence: confidence(r.confidence)?,
        })
    }
}
