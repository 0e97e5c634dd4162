//! CLI binary for meddoc.
//!
//! A thin shim over the library crate: flags map onto `GatewayConfig`, every
//! command drives a `Session`, and results are printed with the library's
//! renderer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use meddoc::{
    health_label, render_result, CompositionPolicy, DocumentTypeHint, GatewayConfig, IntakeEvent,
    IntakeOutcome, Notice, NoticeLevel, Operation, SelectedFile, Session, Style,
};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

const AFTER_HELP: &str = r#"EXAMPLES:
  # Is the backend up?
  meddoc health

  # Detect the type of a document from text
  meddoc detect "Amoxicillin 500mg, 1 tablet three times daily"

  # Enhance text read from stdin, as a lab report
  meddoc enhance --document-type lab-report - < notes.txt

  # OCR a scanned prescription
  meddoc ocr scan.jpg

  # Full processing of a PDF, as JSON
  meddoc --json process discharge.pdf > result.json

  # Interactive session against a remote backend
  meddoc --base-url https://docs.example.org shell

DOCUMENT TYPES (--document-type / shell `type`):
  auto                 let the backend decide (default)
  prescription
  lab_report
  clinical_note
  discharge_summary
  other

ENVIRONMENT VARIABLES:
  MEDDOC_BASE_URL      Backend root URL (default http://localhost:5000)
  MEDDOC_MAX_SIZE_MB   Upload size limit in MB (default 10)
  MEDDOC_ACCEPT        Accepted file types (default image/*,application/pdf,.docx)
  MEDDOC_LAYOUT        inline | navigate
  RUST_LOG             Overrides the log filter
"#;

const SHELL_HELP: &str = "\
Commands:
  text <...>        set the text to process
  type <hint>       set the document type (auto, prescription, lab_report, ...)
  file <path>       choose a file
  drop <path>       drop a file
  clear             forget the selected file
  health            check backend health
  detect            detect the document type of the text
  enhance           enhance the text
  ocr               OCR the selected image
  process           fully process the selected file
  go <path>         navigate to /, /results, or anything else
  open              open the results view on the current result
  show              print the current view
  help              this list
  quit              leave";

/// Client for a medical document processing backend.
#[derive(Parser, Debug)]
#[command(
    name = "meddoc",
    version,
    about = "Client for a medical document processing backend",
    long_about = "Validate and upload medical documents to a processing backend for OCR, \
document type detection, and text enhancement, then print the results. Run `meddoc shell` \
for an interactive session with several operations in flight at once.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend root URL.
    #[arg(long, global = true, env = "MEDDOC_BASE_URL", default_value = meddoc::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Maximum upload size in megabytes.
    #[arg(long, global = true, env = "MEDDOC_MAX_SIZE_MB", default_value_t = meddoc::config::DEFAULT_MAX_SIZE_MB)]
    max_size_mb: f64,

    /// Accepted file types: MIME types, `type/*` prefixes, or `.ext` extensions.
    #[arg(long, global = true, env = "MEDDOC_ACCEPT", default_value = meddoc::config::DEFAULT_ACCEPT)]
    accept: String,

    /// Where results appear in the shell.
    #[arg(long, global = true, env = "MEDDOC_LAYOUT", value_enum, default_value = "inline")]
    layout: LayoutArg,

    /// Print results as JSON envelopes instead of rendering them.
    #[arg(long, global = true, env = "MEDDOC_JSON")]
    json: bool,

    /// Never emit ANSI colour codes.
    #[arg(long, global = true, env = "MEDDOC_NO_COLOR")]
    no_color: bool,

    /// Disable the spinner.
    #[arg(long, global = true, env = "MEDDOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MEDDOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "MEDDOC_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the backend is operational.
    Health,
    /// Detect the document type of a text (`-` reads stdin).
    Detect { text: String },
    /// Enhance a text (`-` reads stdin).
    Enhance {
        text: String,
        /// Document type hint: auto, prescription, lab_report, clinical_note, discharge_summary, other.
        #[arg(short = 't', long, default_value = "auto")]
        document_type: DocumentTypeHint,
    },
    /// Extract text from an image.
    Ocr { file: PathBuf },
    /// OCR, detect, and enhance an image, PDF, or DOCX file.
    Process { file: PathBuf },
    /// Interactive session.
    Shell,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Inline,
    Navigate,
}

impl From<LayoutArg> for CompositionPolicy {
    fn from(v: LayoutArg) -> Self {
        match v {
            LayoutArg::Inline => CompositionPolicy::Inline,
            LayoutArg::Navigate => CompositionPolicy::Navigate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the feedback for one-shot commands, so library
    // INFO logs are suppressed while it is active.
    let interactive = matches!(cli.command, Command::Shell);
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !interactive;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || interactive {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let style = if !cli.no_color && io::stdout().is_terminal() {
        Style::Ansi
    } else {
        Style::Plain
    };

    let config = build_config(&cli)?;
    let mut session = Session::new(&config).context("Failed to start session")?;

    match &cli.command {
        Command::Health => run_health(&cli, &mut session, style, show_progress).await,
        Command::Detect { text } => {
            session.shell_mut().set_text(read_text(text).await?);
            run_one(&cli, &mut session, Operation::Detect, style, show_progress).await
        }
        Command::Enhance {
            text,
            document_type,
        } => {
            session.shell_mut().set_text(read_text(text).await?);
            session.shell_mut().set_hint(*document_type);
            run_one(&cli, &mut session, Operation::Enhance, style, show_progress).await
        }
        Command::Ocr { file } => {
            select_file(&mut session, file)?;
            run_one(&cli, &mut session, Operation::Ocr, style, show_progress).await
        }
        Command::Process { file } => {
            select_file(&mut session, file)?;
            run_one(&cli, &mut session, Operation::Process, style, show_progress).await
        }
        Command::Shell => run_shell(&mut session, style).await,
    }
}

/// Map CLI args to `GatewayConfig`.
fn build_config(cli: &Cli) -> Result<GatewayConfig> {
    GatewayConfig::builder()
        .base_url(cli.base_url.clone())
        .accept(cli.accept.clone())
        .max_size_mb(cli.max_size_mb)
        .layout(cli.layout.into())
        .build()
        .context("Invalid configuration")
}

/// The text argument, or all of stdin for `-`.
async fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

/// Run a path through the same intake as the shell; rejection is fatal.
fn select_file(session: &mut Session, path: &Path) -> Result<()> {
    let file = SelectedFile::from_path(path)
        .with_context(|| format!("Cannot use {}", path.display()))?;
    match session.shell_mut().select_file(IntakeEvent::Browse(Some(file))) {
        IntakeOutcome::Accepted => Ok(()),
        IntakeOutcome::Rejected(reason) => bail!("{}: {reason}", path.display()),
        IntakeOutcome::NoSelection => bail!("No file selected"),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Run `op` to completion, with a spinner if enabled.
async fn run_with_progress(session: &mut Session, op: Operation, show_progress: bool) -> Notice {
    let bar = show_progress.then(|| spinner(op.pending_label()));
    let notice = session.run(op).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    notice
}

async fn run_health(cli: &Cli, session: &mut Session, style: Style, show_progress: bool) -> Result<()> {
    let notice = run_with_progress(session, Operation::Health, show_progress).await;
    let label = health_label(session.shell().health());

    if cli.json {
        println!("{}", serde_json::json!({ "status": label }));
    } else {
        println!("{}  {}", style.bold("System Status"), label);
        if !cli.quiet {
            eprintln!("{}", notice.render(style));
        }
    }
    Ok(())
}

async fn run_one(
    cli: &Cli,
    session: &mut Session,
    op: Operation,
    style: Style,
    show_progress: bool,
) -> Result<()> {
    let notice = run_with_progress(session, op, show_progress).await;
    if notice.level != NoticeLevel::Success {
        bail!("{}", notice.message);
    }

    let result = session.shell().current_result();
    if cli.json {
        let Some(result) = result else {
            bail!("{} returned no result", op.label());
        };
        let json = serde_json::to_string_pretty(result).context("Failed to serialise result")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(render_result(result, style).as_bytes())
            .context("Failed to write to stdout")?;
        if !cli.quiet {
            eprintln!("{}", notice.render(style));
        }
    }
    Ok(())
}

// ── Interactive shell ────────────────────────────────────────────────────────

async fn run_shell(session: &mut Session, style: Style) -> Result<()> {
    println!("{}", session.shell().render_view(style));
    println!("{}", style.dim("Type `help` for commands."));
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let in_flight = session.in_flight() > 0;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if !handle_command(session, line.trim(), style)? {
                    break;
                }
                prompt()?;
            }
            Some(completion) = session.next_completion(), if in_flight => {
                let notice = session.apply(completion);
                println!();
                println!("{}", notice.render(style));
                if notice.level == NoticeLevel::Success {
                    println!("{}", session.shell().render_view(style));
                }
                prompt()?;
            }
        }
    }

    // Let anything still in flight land before leaving.
    while let Some(completion) = session.next_completion().await {
        let notice = session.apply(completion);
        println!("{}", notice.render(style));
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("meddoc> ");
    io::stdout().flush().context("Failed to flush stdout")
}

/// Apply one shell command. Returns `false` to leave the shell.
fn handle_command(session: &mut Session, line: &str, style: Style) -> Result<bool> {
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    let op = match cmd {
        "" => return Ok(true),
        "quit" | "exit" => return Ok(false),
        "help" => {
            println!("{SHELL_HELP}");
            return Ok(true);
        }
        "show" => {
            println!("{}", session.shell().render_view(style));
            return Ok(true);
        }
        "text" => {
            session.shell_mut().set_text(arg);
            return Ok(true);
        }
        "type" => {
            match arg.parse::<DocumentTypeHint>() {
                Ok(hint) => {
                    session.shell_mut().set_hint(hint);
                    println!("{}", style.dim(hint.help()));
                }
                Err(e) => println!("{}", Notice::error(e).render(style)),
            }
            return Ok(true);
        }
        "file" | "drop" => {
            let picked = if arg.is_empty() {
                None
            } else {
                match SelectedFile::from_path(arg) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        println!("{}", Notice::error(e.to_string()).render(style));
                        return Ok(true);
                    }
                }
            };
            let event = if cmd == "drop" {
                IntakeEvent::Drop(picked)
            } else {
                IntakeEvent::Browse(picked)
            };
            match session.shell_mut().select_file(event) {
                IntakeOutcome::Accepted => {
                    if let Some(hint) = session.shell().intake().hint() {
                        println!("{}", style.dim(hint));
                    }
                }
                IntakeOutcome::Rejected(reason) => {
                    println!("{}", Notice::error(reason.to_string()).render(style));
                }
                IntakeOutcome::NoSelection => println!("{}", style.dim("No file selected")),
            }
            return Ok(true);
        }
        "clear" => {
            session.shell_mut().clear_file();
            return Ok(true);
        }
        "go" => {
            let route = session.shell_mut().navigate(arg, None).clone();
            println!("{}", style.dim(&format!("→ {}", route.path())));
            println!("{}", session.shell().render_view(style));
            return Ok(true);
        }
        "open" => {
            session.shell_mut().show_results();
            println!("{}", session.shell().render_view(style));
            return Ok(true);
        }
        "health" => Operation::Health,
        "detect" => Operation::Detect,
        "enhance" => Operation::Enhance,
        "ocr" => Operation::Ocr,
        "process" => Operation::Process,
        other => {
            println!(
                "{}",
                Notice::warning(format!("Unknown command '{other}'. Type `help`.")).render(style)
            );
            return Ok(true);
        }
    };

    match session.submit(op) {
        Some(refused) => println!("{}", refused.render(style)),
        None => println!("{}", style.cyan(op.pending_label())),
    }
    Ok(true)
}
