//! Error types for the meddoc library.
//!
//! Three distinct error types reflect three distinct failure domains:
//!
//! * [`ValidationError`] (local): the selected file was rejected by the
//!   intake policy (too large, wrong type). It never reaches the network and
//!   is normally surfaced inline by [`crate::intake::FileIntake`].
//!
//! * [`RemoteError`] (remote): the backend answered with a non-2xx status,
//!   the transport failed, or the response did not match its declared shape.
//!   Carries the human-readable message extracted from the body when present.
//!
//! * [`MeddocError`]: the umbrella returned by the gateway and the one-shot
//!   entry points. Wraps the two above and adds caller-side precondition
//!   failures (blank text, missing file) that are detected before any request.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback message used when an error body carries no `error` field.
pub const UNKNOWN_REMOTE_ERROR: &str = "An unknown error occurred";

/// All errors returned by the meddoc library.
#[derive(Debug, Error)]
pub enum MeddocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The text submitted for detection or enhancement is empty or blank.
    #[error("Cannot {operation} empty text.\nPlease enter some text first.")]
    EmptyInput { operation: &'static str },

    /// An upload operation was triggered with no file selected.
    #[error("No file selected.\nPlease select a file first.")]
    NoFileSelected,

    /// OCR was requested for a file that is not an image.
    #[error("OCR processing requires an image file (got '{mime_type}')")]
    NotAnImage { mime_type: String },

    /// A file path given for selection does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The selected file was rejected by the intake policy.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The backend call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why the intake policy rejected a file.
///
/// The `Display` text is the inline message shown next to the file picker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The file is larger than the configured limit.
    #[error("File size exceeds {max_size_mb}MB limit.")]
    TooLarge { size_bytes: u64, max_size_mb: f64 },

    /// No accept pattern matched the file's MIME type or extension.
    #[error("File type not supported. Please upload {accepted}.")]
    UnsupportedType { mime_type: String, accepted: String },
}

/// A failed exchange with the processing backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Message from the response body's `error` field, or a fallback.
    pub message: String,
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// A transport-level failure with no response.
    pub fn transport() -> Self {
        Self::new(UNKNOWN_REMOTE_ERROR, None)
    }

    /// A 2xx response whose body did not match the expected shape.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("Malformed response from backend: {detail}"), None)
    }

    /// Build from a non-2xx body, preferring its `error` string field.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string());
        Self::new(message, Some(status))
    }
}
