//! Request-side and status types shared by every backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend health as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// `{"status": "ok"}`
    Ok,
    /// Any other status string the backend chose to report.
    Degraded(String),
    /// `{"status": "error"}`, a non-2xx answer, or no answer at all.
    Error,
}

impl HealthStatus {
    pub fn from_status(status: &str) -> Self {
        match status {
            "ok" => HealthStatus::Ok,
            "error" => HealthStatus::Error,
            other => HealthStatus::Degraded(other.to_string()),
        }
    }

    /// Badge label: `Online`, the raw status, or `Error`.
    pub fn label(&self) -> &str {
        match self {
            HealthStatus::Ok => "Online",
            HealthStatus::Degraded(status) => status,
            HealthStatus::Error => "Error",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

/// Badge label for an optional status; `Unknown` before the first check.
pub fn health_label(status: Option<&HealthStatus>) -> &str {
    status.map_or("Unknown", HealthStatus::label)
}

/// Document type hint for text enhancement.
///
/// [`DocumentTypeHint::AutoDetect`] is never sent: the backend detects the
/// type itself when the field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTypeHint {
    #[default]
    AutoDetect,
    Prescription,
    LabReport,
    ClinicalNote,
    DischargeSummary,
    Other,
}

impl DocumentTypeHint {
    pub const ALL: [DocumentTypeHint; 6] = [
        DocumentTypeHint::AutoDetect,
        DocumentTypeHint::Prescription,
        DocumentTypeHint::LabReport,
        DocumentTypeHint::ClinicalNote,
        DocumentTypeHint::DischargeSummary,
        DocumentTypeHint::Other,
    ];

    /// Wire name, e.g. `lab_report`.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentTypeHint::AutoDetect => "auto_detect",
            DocumentTypeHint::Prescription => "prescription",
            DocumentTypeHint::LabReport => "lab_report",
            DocumentTypeHint::ClinicalNote => "clinical_note",
            DocumentTypeHint::DischargeSummary => "discharge_summary",
            DocumentTypeHint::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentTypeHint::AutoDetect => "Auto-detect",
            DocumentTypeHint::Prescription => "Prescription",
            DocumentTypeHint::LabReport => "Lab Report",
            DocumentTypeHint::ClinicalNote => "Clinical Note",
            DocumentTypeHint::DischargeSummary => "Discharge Summary",
            DocumentTypeHint::Other => "Other",
        }
    }

    /// The value for the request's `document_type` field, if any.
    pub fn to_request_field(self) -> Option<&'static str> {
        match self {
            DocumentTypeHint::AutoDetect => None,
            other => Some(other.as_str()),
        }
    }

    /// Explanation shown under the document type selector.
    pub fn help(self) -> &'static str {
        match self {
            DocumentTypeHint::AutoDetect => {
                "The system will attempt to detect the document type automatically"
            }
            _ => "Document type will be used for text enhancement",
        }
    }
}

impl fmt::Display for DocumentTypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentTypeHint {
    type Err = String;

    /// Accepts wire names (`lab_report`), dashed names (`lab-report`), and `auto`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace('-', "_");
        if norm == "auto" {
            return Ok(DocumentTypeHint::AutoDetect);
        }
        DocumentTypeHint::ALL
            .into_iter()
            .find(|h| h.as_str() == norm)
            .ok_or_else(|| {
                let names: Vec<_> = DocumentTypeHint::ALL.iter().map(|h| h.as_str()).collect();
                format!("unknown document type '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_from_status() {
        assert_eq!(HealthStatus::from_status("ok"), HealthStatus::Ok);
        assert_eq!(HealthStatus::from_status("error"), HealthStatus::Error);
        assert_eq!(
            HealthStatus::from_status("warming_up"),
            HealthStatus::Degraded("warming_up".into())
        );
    }

    #[test]
    fn health_labels() {
        assert_eq!(health_label(None), "Unknown");
        assert_eq!(health_label(Some(&HealthStatus::Ok)), "Online");
        assert_eq!(health_label(Some(&HealthStatus::Error)), "Error");
        assert_eq!(health_label(Some(&HealthStatus::Degraded("busy".into()))), "busy");
    }

    #[test]
    fn auto_detect_is_never_sent() {
        assert_eq!(DocumentTypeHint::AutoDetect.to_request_field(), None);
        assert_eq!(DocumentTypeHint::LabReport.to_request_field(), Some("lab_report"));
    }

    #[test]
    fn hint_parsing() {
        assert_eq!("auto".parse::<DocumentTypeHint>(), Ok(DocumentTypeHint::AutoDetect));
        assert_eq!(
            "Discharge-Summary".parse::<DocumentTypeHint>(),
            Ok(DocumentTypeHint::DischargeSummary)
        );
        assert!("xray".parse::<DocumentTypeHint>().is_err());
    }
}
