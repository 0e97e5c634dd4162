//! The page shell: all interactive state, and the views rendered from it.
//!
//! A [`Shell`] owns exactly one result slot, one file intake, the text form,
//! the last health status, and a [`OpState`] per operation. It never talks to
//! the network. Instead:
//!
//! ```text
//!   trigger(op) ──▶ Request ──▶ (backend, anywhere) ──▶ Completion ──▶ complete()
//!       │                                                                 │
//!       └── Notice (precondition failed, no request)        Notice ◀──────┘
//! ```
//!
//! Each operation runs `Idle → Pending → Idle`. While an operation is pending
//! its control is disabled, so it cannot be triggered twice. Different
//! operations are independent: they may be in flight together, and whichever
//! completes last owns the result slot.
//!
//! Routing is explicit too. The dedicated results view only ever shows a
//! result that was handed to it by [`Shell::navigate`]; entering it without
//! one redirects to the main view.

use crate::config::{CompositionPolicy, GatewayConfig, ValidationPolicy};
use crate::error::MeddocError;
use crate::gateway::{health_label, DocumentTypeHint, HealthStatus, ProcessingBackend};
use crate::intake::{AcceptedFile, FileIntake, FileKind, IntakeEvent, IntakeOutcome};
use crate::render::{render_result, Style};
use crate::result::ProcessingResult;
use std::fmt;
use tracing::{debug, error, info};

// ── Operations ───────────────────────────────────────────────────────────

/// A user-triggerable backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Health,
    Detect,
    Enhance,
    Ocr,
    Process,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Health,
        Operation::Detect,
        Operation::Enhance,
        Operation::Ocr,
        Operation::Process,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Health => "Check Health Status",
            Operation::Detect => "Detect Type",
            Operation::Enhance => "Enhance Text",
            Operation::Ocr => "OCR Image",
            Operation::Process => "Process File",
        }
    }

    /// Button caption while pending.
    pub fn pending_label(self) -> &'static str {
        match self {
            Operation::Health => "Checking...",
            Operation::Detect => "Detecting...",
            Operation::Enhance => "Enhancing...",
            Operation::Ocr | Operation::Process => "Processing...",
        }
    }

    fn success_message(self, result: &ProcessingResult) -> String {
        match self {
            Operation::Detect => format!(
                "Detected document type: {}",
                result.document_type().unwrap_or("unknown")
            ),
            Operation::Enhance => "Text enhanced successfully".into(),
            Operation::Ocr => "OCR processing completed successfully".into(),
            Operation::Process | Operation::Health => "File processed successfully".into(),
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::Health => "Failed to connect to backend",
            Operation::Detect => "Failed to detect document type",
            Operation::Enhance => "Failed to enhance text",
            Operation::Ocr => "Failed to process image with OCR",
            Operation::Process => "Failed to process file",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-operation trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpState {
    #[default]
    Idle,
    Pending,
}

/// How a control should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Can be triggered.
    Ready,
    /// Its operation is in flight.
    Pending,
    /// Its preconditions are not met.
    Unavailable,
}

/// Everything an operation needs, detached from the shell so it can be
/// executed on another task.
#[derive(Debug, Clone)]
pub enum Request {
    Health,
    Detect { text: String },
    Enhance { text: String, hint: DocumentTypeHint },
    Ocr(AcceptedFile),
    Process(AcceptedFile),
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Health => Operation::Health,
            Request::Detect { .. } => Operation::Detect,
            Request::Enhance { .. } => Operation::Enhance,
            Request::Ocr(_) => Operation::Ocr,
            Request::Process(_) => Operation::Process,
        }
    }

    /// Run the request against a backend. Never panics; failures are
    /// carried in the completion.
    pub async fn execute(self, backend: &dyn ProcessingBackend) -> Completion {
        let operation = self.operation();
        let outcome = match self {
            Request::Health => Outcome::Health(backend.health().await),
            Request::Detect { text } => Outcome::Processed(backend.detect_type(&text).await),
            Request::Enhance { text, hint } => {
                Outcome::Processed(backend.enhance_text(&text, hint).await)
            }
            Request::Ocr(file) => Outcome::Processed(backend.ocr_image(&file).await),
            Request::Process(file) => Outcome::Processed(backend.process_file(&file).await),
        };
        Completion { operation, outcome }
    }
}

/// What came back from the backend.
#[derive(Debug)]
pub enum Outcome {
    Health(HealthStatus),
    Processed(Result<ProcessingResult, MeddocError>),
}

/// A finished request, ready to be applied with [`Shell::complete`].
#[derive(Debug)]
pub struct Completion {
    pub operation: Operation,
    pub outcome: Outcome,
}

// ── Notices ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn render(&self, style: Style) -> String {
        match self.level {
            NoticeLevel::Success => format!("{} {}", style.green("✔"), self.message),
            NoticeLevel::Warning => format!("{} {}", style.yellow("⚠"), self.message),
            NoticeLevel::Error => format!("{} {}", style.red("✘"), style.red(&self.message)),
        }
    }
}

// ── Routing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: forms, status, and (inline layout) the live result.
    Main,
    /// `/results`: the result handed over by the last navigation.
    Results,
    /// Anything else.
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        match path.trim() {
            "" | "/" => Route::Main,
            "/results" | "/results/" => Route::Results,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Main => "/",
            Route::Results => "/results",
            Route::NotFound(p) => p,
        }
    }
}

/// A result passed explicitly from one view to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff(pub ProcessingResult);

// ── Shell ────────────────────────────────────────────────────────────────

/// All client-side state of one session.
pub struct Shell {
    layout: CompositionPolicy,
    route: Route,
    result: Option<ProcessingResult>,
    results_view: Option<ProcessingResult>,
    intake: FileIntake,
    text: String,
    hint: DocumentTypeHint,
    health: Option<HealthStatus>,
    ops: [OpState; 5],
}

impl Shell {
    pub fn new(policy: ValidationPolicy, layout: CompositionPolicy) -> Self {
        Self::with_intake(FileIntake::new(policy), layout)
    }

    pub fn with_intake(intake: FileIntake, layout: CompositionPolicy) -> Self {
        Self {
            layout,
            route: Route::Main,
            result: None,
            results_view: None,
            intake,
            text: String::new(),
            hint: DocumentTypeHint::default(),
            health: None,
            ops: [OpState::Idle; 5],
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.policy.clone(), config.layout)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn layout(&self) -> CompositionPolicy {
        self.layout
    }

    /// The inline result slot.
    pub fn result(&self) -> Option<&ProcessingResult> {
        self.result.as_ref()
    }

    /// The result held by the results view.
    pub fn results_view(&self) -> Option<&ProcessingResult> {
        self.results_view.as_ref()
    }

    /// Whatever result is currently on screen, in either layout.
    pub fn current_result(&self) -> Option<&ProcessingResult> {
        match self.route {
            Route::Results => self.results_view.as_ref(),
            _ => self.result.as_ref(),
        }
    }

    pub fn health(&self) -> Option<&HealthStatus> {
        self.health.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hint(&self) -> DocumentTypeHint {
        self.hint
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn state(&self, op: Operation) -> OpState {
        self.ops[op.index()]
    }

    pub fn pending(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(move |op| self.state(*op) == OpState::Pending)
    }

    // ── Form input ───────────────────────────────────────────────────────

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_hint(&mut self, hint: DocumentTypeHint) {
        self.hint = hint;
    }

    pub fn select_file(&mut self, event: IntakeEvent) -> IntakeOutcome {
        self.intake.select(event)
    }

    pub fn clear_file(&mut self) {
        self.intake.clear();
    }

    /// How the control for `op` should be drawn right now.
    pub fn control(&self, op: Operation) -> Control {
        if self.state(op) == OpState::Pending {
            return Control::Pending;
        }
        let available = match op {
            Operation::Health => true,
            Operation::Detect | Operation::Enhance => !self.text.trim().is_empty(),
            Operation::Ocr => self.intake.selected().is_some_and(AcceptedFile::is_image),
            Operation::Process => self
                .intake
                .selected()
                .is_some_and(|f| f.kind().is_processable()),
        };
        if available {
            Control::Ready
        } else {
            Control::Unavailable
        }
    }

    // ── Operation state machine ──────────────────────────────────────────

    /// Press the control for `op`.
    ///
    /// Returns the request to execute and marks `op` pending, or a notice
    /// explaining why nothing was sent.
    pub fn trigger(&mut self, op: Operation) -> Result<Request, Notice> {
        if self.state(op) == OpState::Pending {
            return Err(Notice::warning(format!("{} is already running", op.label())));
        }

        let request = match op {
            Operation::Health => {
                self.health = None;
                Request::Health
            }
            Operation::Detect => {
                if self.text.trim().is_empty() {
                    return Err(Notice::warning(
                        "Please enter some text to detect the document type",
                    ));
                }
                Request::Detect { text: self.text.clone() }
            }
            Operation::Enhance => {
                if self.text.trim().is_empty() {
                    return Err(Notice::warning("Please enter some text to enhance"));
                }
                Request::Enhance {
                    text: self.text.clone(),
                    hint: self.hint,
                }
            }
            Operation::Ocr => {
                let Some(file) = self.intake.selected() else {
                    return Err(Notice::warning("Please select an image file first"));
                };
                if !file.is_image() {
                    return Err(Notice::error("OCR processing requires an image file"));
                }
                Request::Ocr(file.clone())
            }
            Operation::Process => {
                let Some(file) = self.intake.selected() else {
                    return Err(Notice::warning("Please select a file first"));
                };
                if !file.kind().is_processable() {
                    return Err(Notice::error(FileKind::Other.hint()));
                }
                Request::Process(file.clone())
            }
        };

        debug!("{} → pending", op.label());
        self.ops[op.index()] = OpState::Pending;
        Ok(request)
    }

    /// Apply a finished request. The operation always returns to `Idle`.
    pub fn complete(&mut self, completion: Completion) -> Notice {
        let op = completion.operation;
        self.ops[op.index()] = OpState::Idle;
        debug!("{} → idle", op.label());

        match completion.outcome {
            Outcome::Health(status) => {
                let notice = match &status {
                    HealthStatus::Ok => Notice::success("Backend is operational"),
                    HealthStatus::Degraded(_) => Notice::warning("Backend is not healthy"),
                    HealthStatus::Error => Notice::error(op.failure_message()),
                };
                self.health = Some(status);
                notice
            }
            Outcome::Processed(Ok(result)) => {
                info!("{} succeeded ({})", op.label(), result.tag());
                let notice = Notice::success(op.success_message(&result));
                self.publish(result);
                notice
            }
            Outcome::Processed(Err(e)) => {
                error!("{} failed: {}", op.label(), e);
                Notice::error(format!("{}: {}", op.failure_message(), e))
            }
        }
    }

    /// Put a fresh result on screen according to the layout.
    fn publish(&mut self, result: ProcessingResult) {
        match self.layout {
            CompositionPolicy::Inline => self.result = Some(result),
            CompositionPolicy::Navigate => {
                self.result = None;
                self.navigate("/results", Some(Handoff(result)));
            }
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────

    /// Go to `path`, optionally handing a result to the next view.
    ///
    /// Leaving the results view drops its result. Entering it without a
    /// handoff redirects to the main view.
    pub fn navigate(&mut self, path: &str, handoff: Option<Handoff>) -> &Route {
        let target = Route::parse(path);
        self.results_view = None;
        self.route = match (target, handoff) {
            (Route::Results, Some(Handoff(result))) => {
                self.results_view = Some(result);
                Route::Results
            }
            (Route::Results, None) => {
                debug!("No result to show; redirecting to /");
                Route::Main
            }
            (other, _) => other,
        };
        &self.route
    }

    /// Open the results view on the inline result, if there is one.
    pub fn show_results(&mut self) -> &Route {
        let handoff = self.result.clone().map(Handoff);
        self.navigate("/results", handoff)
    }

    // ── Views ────────────────────────────────────────────────────────────

    /// Render the view for the current route.
    pub fn render_view(&self, style: Style) -> String {
        match &self.route {
            Route::Main => self.render_main(style),
            Route::Results => {
                let mut out = format!(
                    "{}\n{}\n\n",
                    style.bold("Results"),
                    style.dim("View your processed document results below")
                );
                out.push_str(&render_result(self.results_view.as_ref(), style));
                out
            }
            Route::NotFound(path) => format!(
                "{}\n{}\n{}\n",
                style.bold("404"),
                "The page you're looking for doesn't exist.",
                style.dim(&format!("No page at '{path}'. Return to home with: go /")),
            ),
        }
    }

    fn render_main(&self, style: Style) -> String {
        let mut out = format!(
            "{}\n{}\n\n",
            style.bold("Medical Document Processor"),
            style.dim("Process, analyze, and enhance medical documents using AI")
        );

        // System status
        let label = health_label(self.health.as_ref());
        let badge = match self.health {
            Some(HealthStatus::Ok) => style.green(&format!("[{label}]")),
            Some(HealthStatus::Error) => style.red(&format!("[{label}]")),
            Some(HealthStatus::Degraded(_)) => style.yellow(&format!("[{label}]")),
            None => format!("[{label}]"),
        };
        out.push_str(&format!("{}  {badge}\n", style.bold("System Status")));
        out.push_str(&format!(
            "  Check if the backend API is operational and responding to requests\n  {}\n\n",
            self.control_line(Operation::Health, style)
        ));

        // Text processing
        out.push_str(&format!("{}\n", style.bold("Text Processing")));
        let preview = text_preview(&self.text);
        out.push_str(&format!("  Text:          {preview}\n"));
        out.push_str(&format!("  Document Type: {}\n", self.hint.label()));
        out.push_str(&format!("  {}\n", style.dim(self.hint.help())));
        out.push_str(&format!(
            "  {}   {}\n\n",
            self.control_line(Operation::Detect, style),
            self.control_line(Operation::Enhance, style)
        ));

        // File processing
        out.push_str(&format!("{}\n", style.bold("File Processing")));
        let policy = self.intake.policy();
        match (self.intake.selected(), self.intake.error()) {
            (Some(file), _) => {
                out.push_str(&format!("  {} {}\n", style.green("✓"), file.name()));
                out.push_str(&format!("  {}\n", style.dim(file.kind().hint())));
            }
            (None, Some(err)) => {
                out.push_str(&format!("  {}\n", style.red(err)));
                out.push_str(&format!("  {}\n", style.dim("Please try again")));
            }
            (None, None) => {
                out.push_str("  Choose a file (file <path>) or drop one (drop <path>)\n");
                out.push_str(&format!(
                    "  {}\n",
                    style.dim(&format!(
                        "{} (up to {}MB)",
                        policy.describe_accepted(),
                        policy.max_size_mb
                    ))
                ));
            }
        }
        if self.intake.selected().is_some() {
            out.push_str(&format!(
                "  {}   {}\n",
                self.control_line(Operation::Ocr, style),
                self.control_line(Operation::Process, style)
            ));
        }

        if self.layout == CompositionPolicy::Inline {
            out.push('\n');
            out.push_str(&render_result(self.result.as_ref(), style));
        }
        out
    }

    fn control_line(&self, op: Operation, style: Style) -> String {
        match self.control(op) {
            Control::Ready => style.bold(&format!("[ {} ]", op.label())),
            Control::Pending => style.cyan(&format!("[ {} ]", op.pending_label())),
            Control::Unavailable => style.dim(&format!("[ {} ]", op.label())),
        }
    }
}

fn text_preview(text: &str) -> String {
    const MAX: usize = 60;
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "(empty)".to_string();
    }
    if flat.chars().count() > MAX {
        let cut: String = flat.chars().take(MAX - 1).collect();
        format!("{cut}…")
    } else {
        flat
    }
}
