//! Configuration types for talking to the processing backend.
//!
//! All client behaviour is controlled through [`GatewayConfig`], built via
//! its [`GatewayConfigBuilder`]. The intake policy and the page composition
//! policy live here too so one value describes a whole session.

use crate::error::MeddocError;
use crate::gateway::ProcessingBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Backend used when neither `--base-url` nor `MEDDOC_BASE_URL` is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Accept list used by the file picker unless overridden.
pub const DEFAULT_ACCEPT: &str = "image/*,application/pdf,.docx";

/// Upload size limit in megabytes unless overridden.
pub const DEFAULT_MAX_SIZE_MB: f64 = 10.0;

/// Configuration for a client session.
///
/// Built via [`GatewayConfig::builder()`] or using
/// [`GatewayConfig::default()`].
///
/// # Example
/// ```rust
/// use meddoc::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .base_url("https://ocr.internal.example")
///     .accept("image/*,application/pdf")
///     .max_size_mb(5.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.policy.max_size_mb, 5.0);
/// ```
#[derive(Clone)]
pub struct GatewayConfig {
    /// Root URL of the processing backend. A trailing `/` is ignored.
    pub base_url: String,

    /// Pre-constructed backend. Takes precedence over `base_url`.
    pub backend: Option<Arc<dyn ProcessingBackend>>,

    /// Size and type policy applied to every selected file.
    pub policy: ValidationPolicy,

    /// Where a fresh result is displayed. Default: [`CompositionPolicy::Inline`].
    pub layout: CompositionPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            backend: None,
            policy: ValidationPolicy::default(),
            layout: CompositionPolicy::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn ProcessingBackend>"))
            .field("policy", &self.policy)
            .field("layout", &self.layout)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new builder for `GatewayConfig`.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder {
            config: Self::default(),
            accept: None,
            max_size_mb: None,
        }
    }

    /// The base URL without a trailing slash.
    pub fn normalised_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
    accept: Option<String>,
    max_size_mb: Option<f64>,
}

impl GatewayConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ProcessingBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Comma-separated accept list, e.g. `"image/*,application/pdf,.docx"`.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn max_size_mb(mut self, mb: f64) -> Self {
        self.max_size_mb = Some(mb);
        self
    }

    pub fn layout(mut self, layout: CompositionPolicy) -> Self {
        self.config.layout = layout;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<GatewayConfig, MeddocError> {
        let base = self.config.base_url.trim();
        if self.config.backend.is_none()
            && !(base.starts_with("http://") || base.starts_with("https://"))
        {
            return Err(MeddocError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.config.base_url
            )));
        }
        self.config.base_url = base.to_string();

        if self.accept.is_some() || self.max_size_mb.is_some() {
            let accept = self.accept.as_deref().unwrap_or(DEFAULT_ACCEPT);
            let max = self.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB);
            self.config.policy = ValidationPolicy::parse(accept, max)?;
        }
        Ok(self.config)
    }
}

// ── Intake policy ────────────────────────────────────────────────────────

/// One entry of the accept list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptPattern {
    /// `image/*`: matches any MIME type starting with `image/`.
    MimePrefix(String),
    /// `.docx`: equal to the lowercased file-name extension. The pattern
    /// itself is kept as written.
    Extension(String),
    /// `application/pdf`: matches the MIME type literally.
    Exact(String),
}

impl AcceptPattern {
    /// Parse a single accept-list entry.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(if raw.contains('*') {
            AcceptPattern::MimePrefix(raw.replacen('*', "", 1))
        } else if raw.starts_with('.') {
            AcceptPattern::Extension(raw.to_string())
        } else {
            AcceptPattern::Exact(raw.to_string())
        })
    }

    /// Does a file with this MIME type and (lowercased, dotted) extension match?
    pub fn matches(&self, mime_type: &str, extension: &str) -> bool {
        match self {
            AcceptPattern::MimePrefix(prefix) => mime_type.starts_with(prefix.as_str()),
            AcceptPattern::Extension(ext) => extension == ext.as_str(),
            AcceptPattern::Exact(mime) => mime_type == mime,
        }
    }
}

impl fmt::Display for AcceptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptPattern::MimePrefix(prefix) => write!(f, "{prefix}*"),
            AcceptPattern::Extension(ext) => f.write_str(ext),
            AcceptPattern::Exact(mime) => f.write_str(mime),
        }
    }
}

/// Size and type policy for the file picker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Maximum file size in megabytes (1 MB = 1024 × 1024 bytes).
    pub max_size_mb: f64,
    /// A file is accepted when any pattern matches.
    pub accepted: Vec<AcceptPattern>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            accepted: vec![
                AcceptPattern::MimePrefix("image/".into()),
                AcceptPattern::Exact("application/pdf".into()),
                AcceptPattern::Extension(".docx".into()),
            ],
        }
    }
}

impl ValidationPolicy {
    /// Parse a comma-separated accept list and a size limit.
    pub fn parse(accept: &str, max_size_mb: f64) -> Result<Self, MeddocError> {
        if !max_size_mb.is_finite() || max_size_mb <= 0.0 {
            return Err(MeddocError::InvalidConfig(format!(
                "max size must be a positive number of megabytes, got {max_size_mb}"
            )));
        }
        let accepted: Vec<AcceptPattern> =
            accept.split(',').filter_map(AcceptPattern::parse).collect();
        if accepted.is_empty() {
            return Err(MeddocError::InvalidConfig(
                "accept list must name at least one type".into(),
            ));
        }
        Ok(Self {
            max_size_mb,
            accepted,
        })
    }

    /// Size limit in bytes.
    pub fn max_size_bytes(&self) -> f64 {
        self.max_size_mb * 1024.0 * 1024.0
    }

    /// Human-readable accept list, e.g. `image/*, application/pdf, .docx`.
    pub fn describe_accepted(&self) -> String {
        self.accepted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ── Page composition ─────────────────────────────────────────────────────

/// How a fresh result reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositionPolicy {
    /// The combined view shows the result next to the forms. (default)
    #[default]
    Inline,
    /// Each result navigates to the dedicated results view.
    Navigate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_default_accept_string() {
        let parsed = ValidationPolicy::parse(DEFAULT_ACCEPT, DEFAULT_MAX_SIZE_MB).unwrap();
        assert_eq!(parsed, ValidationPolicy::default());
        assert_eq!(parsed.describe_accepted(), "image/*, application/pdf, .docx");
    }

    #[test]
    fn parse_skips_blank_entries() {
        let p = ValidationPolicy::parse(" image/png , ,.PDF", 1.0).unwrap();
        assert_eq!(
            p.accepted,
            vec![
                AcceptPattern::Exact("image/png".into()),
                AcceptPattern::Extension(".PDF".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_empty_accept_list() {
        assert!(matches!(
            ValidationPolicy::parse(" , ", 10.0),
            Err(MeddocError::InvalidConfig(_))
        ));
    }

    #[test]
    fn parse_rejects_non_positive_size() {
        assert!(ValidationPolicy::parse(DEFAULT_ACCEPT, 0.0).is_err());
        assert!(ValidationPolicy::parse(DEFAULT_ACCEPT, -3.0).is_err());
        assert!(ValidationPolicy::parse(DEFAULT_ACCEPT, f64::NAN).is_err());
    }

    #[test]
    fn pattern_matching() {
        let wildcard = AcceptPattern::parse("image/*").unwrap();
        assert!(wildcard.matches("image/jpeg", ".jpg"));
        assert!(!wildcard.matches("application/pdf", ".pdf"));

        let ext = AcceptPattern::parse(".docx").unwrap();
        assert!(ext.matches("application/octet-stream", ".docx"));
        assert!(!ext.matches("application/octet-stream", ".doc"));

        let exact = AcceptPattern::parse("application/pdf").unwrap();
        assert!(exact.matches("application/pdf", ".pdf"));
        assert!(!exact.matches("application/pdf+x", ".pdf"));
    }

    #[test]
    fn builder_rejects_non_http_base_url() {
        let err = GatewayConfig::builder().base_url("ftp://x").build();
        assert!(matches!(err, Err(MeddocError::InvalidConfig(_))));
    }

    #[test]
    fn builder_trims_and_applies_policy() {
        let c = GatewayConfig::builder()
            .base_url(" http://backend:5000/ ")
            .max_size_mb(2.5)
            .build()
            .unwrap();
        assert_eq!(c.normalised_base_url(), "http://backend:5000");
        assert_eq!(c.policy.max_size_mb, 2.5);
        assert_eq!(c.policy.accepted, ValidationPolicy::default().accepted);
    }

    #[test]
    fn debug_hides_backend() {
        let c = GatewayConfig::default();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("base_url"));
        assert!(dbg.contains("backend: None"));
    }
}
