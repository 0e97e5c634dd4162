//! # meddoc
//!
//! Client for a medical document processing backend.
//!
//! The backend does the heavy lifting (OCR, document type detection, and
//! language-model text enhancement). This crate is everything in front of
//! it: choosing and validating a file, calling the five HTTP endpoints,
//! keeping the interactive state of a session, and presenting results.
//!
//! ## Overview
//!
//! ```text
//! user input
//!  │
//!  ├─ 1. Intake    validate one file against size + type policy
//!  ├─ 2. Shell     per-operation Idle → Pending → Idle, one result slot
//!  ├─ 3. Gateway   /health, /detect-document-type, /enhance-text,
//!  │               /ocr-image, /process-file
//!  └─ 4. Render    tagged result → terminal text (Markdown for enhanced text)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meddoc::{GatewayConfig, Operation, Session, Style};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::builder()
//!         .base_url("http://localhost:5000")
//!         .build()?;
//!     let mut session = Session::new(&config)?;
//!
//!     session.shell_mut().set_text("Amoxicillin 500mg three times daily");
//!     let notice = session.run(Operation::Detect).await;
//!     eprintln!("{}", notice.message);
//!     println!("{}", session.shell().render_view(Style::Plain));
//!     Ok(())
//! }
//! ```
//!
//! Calling the backend directly, without any session state:
//!
//! ```rust,no_run
//! use meddoc::{DocumentTypeHint, HttpGateway, ProcessingBackend};
//!
//! # async fn demo() -> Result<(), meddoc::MeddocError> {
//! let gateway = HttpGateway::new("http://localhost:5000")?;
//! let result = gateway
//!     .enhance_text("bp 120/80 hr 72", DocumentTypeHint::ClinicalNote)
//!     .await?;
//! println!("{}", meddoc::render_result(Some(&result), meddoc::Style::Plain));
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `meddoc` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! meddoc = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod listener;
pub mod render;
pub mod result;
pub mod session;
pub mod shell;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AcceptPattern, CompositionPolicy, GatewayConfig, GatewayConfigBuilder, ValidationPolicy};
pub use error::{MeddocError, RemoteError, ValidationError};
pub use gateway::{health_label, DocumentTypeHint, HealthStatus, HttpGateway, ProcessingBackend};
pub use intake::{validate, AcceptedFile, FileIntake, FileKind, IntakeEvent, IntakeOutcome, SelectedFile};
pub use listener::{NoopSelectionListener, SelectionListener, SharedSelectionListener};
pub use render::{render_envelope, render_result, Style};
pub use result::{Confidence, EnvelopeError, ProcessingResult};
pub use session::Session;
pub use shell::{
    Completion, Control, Handoff, Notice, NoticeLevel, OpState, Operation, Outcome, Request, Route,
    Shell,
};
