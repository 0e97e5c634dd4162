//! Result presentation.
//!
//! Rendering is a pure function of an optional [`ProcessingResult`]: a
//! placeholder when there is none, otherwise one layout per variant. Untyped
//! envelopes go through [`render_envelope`], which shows an "unknown result
//! type" notice instead of guessing when the tag or payload does not fit.
//!
//! 1. [`style`]    : ANSI emphasis, or none at all
//! 2. [`normalise`]: display cleanup of model-generated Markdown
//! 3. [`markdown`] : Markdown → terminal rich text

pub mod markdown;
pub mod normalise;
pub mod style;

pub use markdown::render_markdown;
pub use style::Style;

use crate::result::{Confidence, ProcessingResult};
use tracing::warn;

const RAW_RULE_WIDTH: usize = 40;

/// Render the results panel for an optional result.
pub fn render_result(result: Option<&ProcessingResult>, style: Style) -> String {
    let mut out = title("Results", style);
    match result {
        None => {
            out.push_str("No results to display\n");
            out.push_str(&style.dim("Process text or files to see results here"));
            out.push('\n');
        }
        Some(result) => out.push_str(&render_body(result, style)),
    }
    out
}

/// Render an untyped `{type, data}` envelope, e.g. one read back from `--json` output.
pub fn render_envelope(value: &serde_json::Value, style: Style) -> String {
    match ProcessingResult::from_envelope(value) {
        Ok(result) => render_result(Some(&result), style),
        Err(e) => {
            warn!("Not rendering result: {}", e);
            let mut out = title("Results", style);
            out.push_str(&style.yellow(&format!("Unknown result type: {}", e.tag())));
            out.push('\n');
            out
        }
    }
}

fn render_body(result: &ProcessingResult, style: Style) -> String {
    let mut out = String::new();
    match result {
        ProcessingResult::TypeDetection {
            document_type,
            confidence,
        } => {
            out.push_str(&heading("Document Type Detection", style));
            out.push_str(&badge_line(document_type, *confidence, style));
        }

        ProcessingResult::TextEnhancement {
            enhanced_text,
            document_type,
        } => {
            out.push_str(&heading("Enhanced Text", style));
            if let Some(doc_type) = document_type {
                out.push_str(&style.badge(doc_type));
                out.push_str("\n\n");
            }
            out.push_str(&render_markdown(enhanced_text, style));
        }

        ProcessingResult::OcrResult { text, confidence } => {
            out.push_str(&heading("OCR Result", style));
            if let Some(c) = confidence {
                out.push_str(&confidence_label(*c, style));
                out.push('\n');
            }
            out.push_str(&raw_block(text, style));
        }

        ProcessingResult::FullProcess {
            text,
            document_type,
            enhanced_text,
            confidence,
        } => {
            out.push_str(&heading("Document Type", style));
            out.push_str(&badge_line(document_type, *confidence, style));
            out.push('\n');
            out.push_str(&heading("Extracted Text", style));
            out.push_str(&raw_block(text, style));
            out.push('\n');
            out.push_str(&heading("Enhanced Text", style));
            out.push_str(&render_markdown(enhanced_text, style));
        }
    }
    out
}

fn title(text: &str, style: Style) -> String {
    format!("{}\n\n", style.bold(text))
}

fn heading(text: &str, style: Style) -> String {
    format!("{}\n", style.bold(text))
}

fn confidence_label(c: Confidence, style: Style) -> String {
    style.dim(&format!("Confidence: {c}"))
}

fn badge_line(document_type: &str, confidence: Option<Confidence>, style: Style) -> String {
    let mut line = style.badge(document_type);
    if let Some(c) = confidence {
        line.push_str("  ");
        line.push_str(&confidence_label(c, style));
    }
    line.push('\n');
    line
}

/// Verbatim text between two rules.
fn raw_block(text: &str, style: Style) -> String {
    let rule = style.dim(&"─".repeat(RAW_RULE_WIDTH));
    let mut out = format!("{rule}\n{text}");
    if !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conf(v: f64) -> Option<Confidence> {
        Confidence::new(v)
    }

    #[test]
    fn placeholder_when_empty() {
        let out = render_result(None, Style::Plain);
        assert!(out.starts_with("Results\n"));
        assert!(out.contains("No results to display"));
        assert!(out.contains("Process text or files to see results here"));
    }

    #[test]
    fn type_detection_shows_badge_and_percentage() {
        let r = ProcessingResult::TypeDetection {
            document_type: "prescription".into(),
            confidence: conf(0.926),
        };
        let out = render_result(Some(&r), Style::Plain);
        assert!(out.contains("Document Type Detection"));
        assert!(out.contains("[prescription]  Confidence: 93%"));
    }

    #[test]
    fn confidence_line_is_omitted_when_absent() {
        let r = ProcessingResult::OcrResult {
            text: "Rx: Lisinopril".into(),
            confidence: None,
        };
        let out = render_result(Some(&r), Style::Plain);
        assert!(out.contains("OCR Result"));
        assert!(!out.contains("Confidence"));
        assert!(out.contains("Rx: Lisinopril"));
    }

    #[test]
    fn ocr_text_is_verbatim() {
        let text = "  Line one **not bold**\n\tLine two";
        let r = ProcessingResult::OcrResult {
            text: text.into(),
            confidence: conf(0.5),
        };
        let out = render_result(Some(&r), Style::Plain);
        assert!(out.contains(text), "got: {out:?}");
        assert!(out.contains("Confidence: 50%"));
    }

    #[test]
    fn enhancement_renders_markdown() {
        let r = ProcessingResult::TextEnhancement {
            enhanced_text: "## Assessment\n\nPatient is **stable**.".into(),
            document_type: Some("clinical_note".into()),
        };
        let out = render_result(Some(&r), Style::Plain);
        assert!(out.contains("[clinical_note]"));
        assert!(out.contains("Assessment\n----------"));
        assert!(out.contains("Patient is stable."));
        assert!(!out.contains("**"));
    }

    #[test]
    fn full_process_shows_all_fields() {
        let r = ProcessingResult::FullProcess {
            text: "RAW: hb 13.2 g/dL".into(),
            document_type: "lab_report".into(),
            enhanced_text: "Hemoglobin within range.".into(),
            confidence: conf(0.81),
        };
        let out = render_result(Some(&r), Style::Plain);
        for needle in [
            "Document Type\n",
            "[lab_report]",
            "Confidence: 81%",
            "Extracted Text",
            "RAW: hb 13.2 g/dL",
            "Enhanced Text",
            "Hemoglobin within range.",
        ] {
            assert!(out.contains(needle), "missing {needle:?} in {out:?}");
        }
    }

    #[test]
    fn envelope_with_unknown_tag_shows_notice() {
        let out = render_envelope(&json!({"type": "summary", "data": {"x": 1}}), Style::Plain);
        assert!(out.contains("Unknown result type: summary"));
    }

    #[test]
    fn envelope_with_mismatched_payload_shows_notice() {
        let out = render_envelope(&json!({"type": "ocr", "data": {"document_type": "x"}}), Style::Plain);
        assert!(out.contains("Unknown result type: ocr"));
    }

    #[test]
    fn envelope_with_known_tag_renders() {
        let out = render_envelope(
            &json!({"type": "text", "data": {"document_type": "other"}}),
            Style::Plain,
        );
        assert!(out.contains("[other]"));
    }
}
