//! File intake: select, validate, and retain one file for upload.
//!
//! A selection arrives either from browsing (`file <path>`) or from a drop
//! (`drop <path>`). Both are [`IntakeEvent`]s and both run through
//! [`FileIntake::select`], so the two paths cannot drift apart.
//!
//! Validation itself is the pure function [`validate`]: size first, then
//! type. The stateful [`FileIntake`] adds the side effects: retaining the
//! accepted file, keeping the inline error text, and notifying its
//! [`SelectionListener`].

use crate::config::ValidationPolicy;
use crate::error::{MeddocError, ValidationError};
use crate::listener::{NoopSelectionListener, SharedSelectionListener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// MIME type of Word `.docx` documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Where the bytes of a selected file live.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// Read from disk at submission time.
    Path(PathBuf),
    /// Already in memory.
    Memory(Vec<u8>),
}

/// A user-chosen file: name, MIME type, size, and a handle on its bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub source: FileSource,
}

impl SelectedFile {
    /// Describe a file on disk, guessing its MIME type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which only an
    /// extension pattern in the policy can accept.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MeddocError> {
        let path = path.as_ref().to_path_buf();
        let meta = match std::fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(MeddocError::FileNotFound { path }),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(MeddocError::PermissionDenied { path });
            }
            Err(_) => return Err(MeddocError::FileNotFound { path }),
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        debug!("Described {} as {} ({} bytes)", name, mime_type, meta.len());
        Ok(Self {
            name,
            mime_type,
            size_bytes: meta.len(),
            source: FileSource::Path(path),
        })
    }

    /// Describe an in-memory buffer.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Lowercased text after the last `.` of the name, with a leading dot,
    /// e.g. `.docx`. A name without a dot is taken whole, so both `docx` and
    /// `.docx` give `.docx`.
    pub fn extension(&self) -> String {
        let last = self.name.rsplit('.').next().unwrap_or(&self.name);
        format!(".{}", last.to_lowercase())
    }

    /// Load the file's bytes for upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, MeddocError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    MeddocError::PermissionDenied { path: path.clone() }
                }
                std::io::ErrorKind::NotFound => MeddocError::FileNotFound { path: path.clone() },
                _ => MeddocError::Internal(format!("Failed to read {}: {e}", path.display())),
            }),
        }
    }
}

/// Coarse file category, used to decide which uploads make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Docx,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else if mime_type == "application/pdf" {
            FileKind::Pdf
        } else if mime_type == DOCX_MIME {
            FileKind::Docx
        } else {
            FileKind::Other
        }
    }

    /// Whether the full processing pipeline accepts this kind.
    pub fn is_processable(self) -> bool {
        !matches!(self, FileKind::Other)
    }

    /// One-line description of what can be done with the file.
    pub fn hint(self) -> &'static str {
        match self {
            FileKind::Image => "Image files can be processed with OCR or full processing",
            FileKind::Pdf => "PDF files will be processed using OCR and enhancement",
            FileKind::Docx => "DOCX files will be processed using text extraction and enhancement",
            FileKind::Other => "Unsupported file type",
        }
    }
}

/// A file that passed the intake policy.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedFile {
    file: SelectedFile,
    kind: FileKind,
}

impl AcceptedFile {
    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn is_image(&self) -> bool {
        self.kind == FileKind::Image
    }
}

/// Check a file against the policy: size first, then type.
pub fn validate(file: &SelectedFile, policy: &ValidationPolicy) -> Result<AcceptedFile, ValidationError> {
    if file.size_bytes as f64 > policy.max_size_bytes() {
        return Err(ValidationError::TooLarge {
            size_bytes: file.size_bytes,
            max_size_mb: policy.max_size_mb,
        });
    }

    let extension = file.extension();
    let matched = policy
        .accepted
        .iter()
        .any(|p| p.matches(&file.mime_type, &extension));
    if !matched {
        return Err(ValidationError::UnsupportedType {
            mime_type: file.mime_type.clone(),
            accepted: policy.describe_accepted(),
        });
    }

    Ok(AcceptedFile {
        kind: FileKind::from_mime(&file.mime_type),
        file: file.clone(),
    })
}

/// How a selection reached the intake.
#[derive(Debug, Clone)]
pub enum IntakeEvent {
    /// Picked through the file browser.
    Browse(Option<SelectedFile>),
    /// Dropped onto the intake.
    Drop(Option<SelectedFile>),
}

impl IntakeEvent {
    fn into_file(self) -> Option<SelectedFile> {
        match self {
            IntakeEvent::Browse(f) | IntakeEvent::Drop(f) => f,
        }
    }
}

/// What a selection did to the intake.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// Nothing was selected; any retained file was cleared.
    NoSelection,
    /// The file is now retained for upload.
    Accepted,
    /// The file was refused; any retained file was cleared.
    Rejected(ValidationError),
}

/// Stateful file picker holding at most one accepted file.
pub struct FileIntake {
    policy: ValidationPolicy,
    selected: Option<AcceptedFile>,
    error: Option<String>,
    listener: SharedSelectionListener,
}

impl FileIntake {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            selected: None,
            error: None,
            listener: Arc::new(NoopSelectionListener),
        }
    }

    pub fn with_listener(mut self, listener: SharedSelectionListener) -> Self {
        self.listener = listener;
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// The retained file, if any.
    pub fn selected(&self) -> Option<&AcceptedFile> {
        self.selected.as_ref()
    }

    /// Inline error from the last rejected selection.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hint for the retained file's kind.
    pub fn hint(&self) -> Option<&'static str> {
        self.selected.as_ref().map(|f| f.kind().hint())
    }

    /// Apply a browse or drop event.
    pub fn select(&mut self, event: IntakeEvent) -> IntakeOutcome {
        self.error = None;

        let Some(file) = event.into_file() else {
            self.selected = None;
            self.listener.on_file_selected(None);
            return IntakeOutcome::NoSelection;
        };

        match validate(&file, &self.policy) {
            Ok(accepted) => {
                info!("Selected {} ({})", accepted.name(), accepted.mime_type());
                self.selected = Some(accepted);
                self.listener.on_file_selected(self.selected.as_ref());
                IntakeOutcome::Accepted
            }
            Err(reason) => {
                debug!("Rejected {}: {}", file.name, reason);
                self.selected = None;
                self.error = Some(reason.to_string());
                self.listener.on_file_selected(None);
                IntakeOutcome::Rejected(reason)
            }
        }
    }

    /// Drop the retained file and any inline error.
    pub fn clear(&mut self) {
        self.selected = None;
        self.error = None;
        self.listener.on_file_selected(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationPolicy;

    const MB: usize = 1024 * 1024;

    fn file(name: &str, mime: &str, size: usize) -> SelectedFile {
        SelectedFile {
            name: name.into(),
            mime_type: mime.into(),
            size_bytes: size as u64,
            source: FileSource::Memory(Vec::new()),
        }
    }

    #[test]
    fn oversized_jpeg_is_too_large() {
        let policy = ValidationPolicy::default();
        let err = validate(&file("scan.jpg", "image/jpeg", 15 * MB), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn size_is_checked_before_type() {
        let policy = ValidationPolicy::default();
        let err = validate(&file("notes.txt", "text/plain", 11 * MB), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let policy = ValidationPolicy::default();
        assert!(validate(&file("a.png", "image/png", 10 * MB), &policy).is_ok());
        assert!(validate(&file("a.png", "image/png", 10 * MB + 1), &policy).is_err());
    }

    #[test]
    fn each_pattern_kind_accepts() {
        let policy = ValidationPolicy::default();
        let img = validate(&file("x.heic", "image/heic", 10), &policy).unwrap();
        assert_eq!(img.kind(), FileKind::Image);
        let pdf = validate(&file("x.pdf", "application/pdf", 10), &policy).unwrap();
        assert_eq!(pdf.kind(), FileKind::Pdf);
        let docx = validate(&file("Report.DOCX", "application/octet-stream", 10), &policy).unwrap();
        assert_eq!(docx.kind(), FileKind::Other);
    }

    #[test]
    fn unmatched_type_is_unsupported() {
        let policy = ValidationPolicy::default();
        let err = validate(&file("notes.txt", "text/plain", 10), &policy).unwrap_err();
        match err {
            ValidationError::UnsupportedType { mime_type, accepted } => {
                assert_eq!(mime_type, "text/plain");
                assert_eq!(accepted, "image/*, application/pdf, .docx");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_and_dot_names_count_as_extensions() {
        let policy = ValidationPolicy::default();
        for name in ["docx", ".docx", "DOCX", "archive.tar.docx"] {
            assert!(
                validate(&file(name, "application/octet-stream", 1), &policy).is_ok(),
                "{name} should be accepted"
            );
        }
        assert!(validate(&file("docx.txt", "application/octet-stream", 1), &policy).is_err());
    }

    #[test]
    fn extension_pattern_is_compared_as_written() {
        let policy = ValidationPolicy::parse(".DOCX", 10.0).unwrap();
        assert!(validate(&file("report.docx", "application/octet-stream", 1), &policy).is_err());
    }

    #[test]
    fn rejection_clears_previous_selection() {
        let mut intake = FileIntake::new(ValidationPolicy::default());
        assert_eq!(
            intake.select(IntakeEvent::Browse(Some(file("a.pdf", "application/pdf", 10)))),
            IntakeOutcome::Accepted
        );
        assert_eq!(intake.selected().map(|f| f.name()), Some("a.pdf"));

        let outcome = intake.select(IntakeEvent::Drop(Some(file("b.exe", "application/x-msdownload", 10))));
        assert!(matches!(outcome, IntakeOutcome::Rejected(_)));
        assert!(intake.selected().is_none());
        assert!(intake.error().unwrap().starts_with("File type not supported"));
    }

    #[test]
    fn none_selection_clears_state() {
        let mut intake = FileIntake::new(ValidationPolicy::default());
        intake.select(IntakeEvent::Browse(Some(file("x.txt", "text/plain", 1))));
        assert!(intake.error().is_some());

        assert_eq!(intake.select(IntakeEvent::Browse(None)), IntakeOutcome::NoSelection);
        assert!(intake.selected().is_none());
        assert!(intake.error().is_none());
    }

    #[test]
    fn browse_and_drop_agree() {
        let candidates = [
            file("a.png", "image/png", 5),
            file("a.txt", "text/plain", 5),
            file("big.pdf", "application/pdf", 20 * MB),
        ];
        for f in candidates {
            let mut a = FileIntake::new(ValidationPolicy::default());
            let mut b = FileIntake::new(ValidationPolicy::default());
            assert_eq!(
                a.select(IntakeEvent::Browse(Some(f.clone()))),
                b.select(IntakeEvent::Drop(Some(f)))
            );
            assert_eq!(a.selected(), b.selected());
            assert_eq!(a.error(), b.error());
        }
    }

    #[test]
    fn hint_follows_kind() {
        let mut intake = FileIntake::new(ValidationPolicy::default());
        intake.select(IntakeEvent::Browse(Some(file("a.docx", DOCX_MIME, 5))));
        assert_eq!(intake.hint(), Some(FileKind::Docx.hint()));
        intake.clear();
        assert_eq!(intake.hint(), None);
    }

    #[test]
    fn from_path_guesses_mime_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.pdf");
        std::fs::write(&path, b"%PDF-1.7 test").unwrap();

        let f = SelectedFile::from_path(&path).unwrap();
        assert_eq!(f.name, "letter.pdf");
        assert_eq!(f.mime_type, "application/pdf");
        assert_eq!(f.size_bytes, 13);
        assert_eq!(f.extension(), ".pdf");
    }

    #[test]
    fn from_path_missing_file() {
        let err = SelectedFile::from_path("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, MeddocError::FileNotFound { .. }));
    }

    #[test]
    fn read_bytes_from_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let disk = SelectedFile::from_path(&path).unwrap();
        let mem = SelectedFile::from_bytes("scan.png", "image/png", vec![1, 2, 3]);
        assert_eq!(tokio_test::block_on(disk.read_bytes()).unwrap(), vec![1, 2, 3]);
        assert_eq!(tokio_test::block_on(mem.read_bytes()).unwrap(), vec![1, 2, 3]);
    }
}
