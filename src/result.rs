//! Typed processing results.
//!
//! Every successful backend call yields exactly one [`ProcessingResult`].
//! On the wire and in `--json` output a result travels as an envelope
//! `{"type": "<tag>", "data": {...}}` with one tag per variant:
//!
//! | Tag           | Variant                                |
//! |---------------|----------------------------------------|
//! | `text`        | [`ProcessingResult::TypeDetection`]    |
//! | `enhancement` | [`ProcessingResult::TextEnhancement`]  |
//! | `ocr`         | [`ProcessingResult::OcrResult`]        |
//! | `process`     | [`ProcessingResult::FullProcess`]      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A model confidence score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// `None` when `value` is outside `[0, 1]` or not a number.
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Rounded percentage, e.g. `0.876` → `88`.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl TryFrom<f64> for Confidence {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Confidence::new(value).ok_or_else(|| format!("confidence {value} is outside [0, 1]"))
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// The outcome of one successful backend operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProcessingResult {
    /// `POST /detect-document-type`
    #[serde(rename = "text")]
    TypeDetection {
        document_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<Confidence>,
    },

    /// `POST /enhance-text`
    #[serde(rename = "enhancement")]
    TextEnhancement {
        enhanced_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_type: Option<String>,
    },

    /// `POST /ocr-image`
    #[serde(rename = "ocr")]
    OcrResult {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<Confidence>,
    },

    /// `POST /process-file`
    #[serde(rename = "process")]
    FullProcess {
        text: String,
        document_type: String,
        enhanced_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<Confidence>,
    },
}

impl ProcessingResult {
    /// The envelope tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            ProcessingResult::TypeDetection { .. } => "text",
            ProcessingResult::TextEnhancement { .. } => "enhancement",
            ProcessingResult::OcrResult { .. } => "ocr",
            ProcessingResult::FullProcess { .. } => "process",
        }
    }

    pub fn confidence(&self) -> Option<Confidence> {
        match self {
            ProcessingResult::TypeDetection { confidence, .. }
            | ProcessingResult::OcrResult { confidence, .. }
            | ProcessingResult::FullProcess { confidence, .. } => *confidence,
            ProcessingResult::TextEnhancement { .. } => None,
        }
    }

    pub fn document_type(&self) -> Option<&str> {
        match self {
            ProcessingResult::TypeDetection { document_type, .. }
            | ProcessingResult::FullProcess { document_type, .. } => Some(document_type),
            ProcessingResult::TextEnhancement { document_type, .. } => document_type.as_deref(),
            ProcessingResult::OcrResult { .. } => None,
        }
    }

    /// Decode an untyped `{type, data}` envelope.
    ///
    /// Fails with [`EnvelopeError::UnknownTag`] when the tag names no variant,
    /// and with [`EnvelopeError::Mismatch`] when the payload does not have the
    /// shape the tag promises.
    pub fn from_envelope(value: &serde_json::Value) -> Result<Self, EnvelopeError> {
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(EnvelopeError::MissingTag)?;
        if !KNOWN_TAGS.contains(&tag) {
            return Err(EnvelopeError::UnknownTag(tag.to_string()));
        }
        serde_json::from_value(value.clone()).map_err(|e| EnvelopeError::Mismatch {
            tag: tag.to_string(),
            detail: e.to_string(),
        })
    }
}

const KNOWN_TAGS: [&str; 4] = ["text", "enhancement", "ocr", "process"];

/// Why an untyped envelope could not become a [`ProcessingResult`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("result has no type tag")]
    MissingTag,
    #[error("unknown result type: {0}")]
    UnknownTag(String),
    #[error("payload does not match result type '{tag}': {detail}")]
    Mismatch { tag: String, detail: String },
}

impl EnvelopeError {
    /// The tag to name in an "unknown result type" notice.
    pub fn tag(&self) -> &str {
        match self {
            EnvelopeError::MissingTag => "(none)",
            EnvelopeError::UnknownTag(tag) | EnvelopeError::Mismatch { tag, .. } => tag,
        }
    }
}
