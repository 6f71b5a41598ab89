//! CLI binary for lecture-study.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, submits one file and prints the study material.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lecture_study::{
    extract_file, request_from_path, Audience, ClientConfig, ProcessingMode, ProgressCallback,
    Purpose, StudyMaterial, SubmissionOrchestrator, SubmissionProgressCallback, SubmitOutcome,
    UploadError, DEFAULT_BASE_URL,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the backend works on the upload.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        Arc::new(Self { bar })
    }
}

impl SubmissionProgressCallback for CliProgressCallback {
    fn on_submit_start(&self, _seq: u64, file_name: &str) {
        self.bar.set_prefix("Summarising");
        self.bar.set_message(file_name.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_success(&self, _seq: u64, material: &StudyMaterial) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} terms, {} questions",
            green("✔"),
            bold(&material.terms.len().to_string()),
            bold(&material.questions.len().to_string()),
        );
    }

    fn on_failure(&self, _seq: u64, error: &UploadError) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), error.notice());
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a deck for exam revision
  study lecture03.pdf --purpose exam

  # Intermediate audience, JSON output
  study --audience intermediate --json slides.pptx > material.json

  # Backend on another host
  study --api-url http://10.0.0.5:8080 lecture03.pdf

  # No backend: pull readable text from the file itself
  study --offline lecture03.pdf

ENVIRONMENT VARIABLES:
  STUDY_API_URL     Backend base URL (default http://localhost:8080)
  STUDY_TIMEOUT     Whole-request timeout in seconds (default: none)
  RUST_LOG          Log filter, overrides -v / -q
"#;

/// Turn lecture slides into summaries, glossaries and practice questions.
#[derive(Parser, Debug)]
#[command(
    name = "study",
    version,
    about = "Turn lecture slides into summaries, glossaries and practice questions",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Lecture file (PDF, PPT or PPTX).
    file: PathBuf,

    /// Who the material is for: novice or intermediate.
    #[arg(long, env = "STUDY_AUDIENCE", default_value = "novice")]
    audience: Audience,

    /// What the material is for: understanding or exam.
    #[arg(long, env = "STUDY_PURPOSE", default_value = "understanding")]
    purpose: Purpose,

    /// Backend processing mode: auto, gemini_only, docai_then_gemini.
    #[arg(long, env = "STUDY_MODE")]
    mode: Option<ProcessingMode>,

    /// Backend base URL.
    #[arg(long, env = "STUDY_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "STUDY_TIMEOUT")]
    timeout: Option<u64>,

    /// Skip the backend and summarise text extracted from the file bytes.
    #[arg(long)]
    offline: bool,

    /// Print only the raw fallback excerpt and exit.
    #[arg(long, conflicts_with = "json")]
    excerpt_only: bool,

    /// Output the material as JSON.
    #[arg(long, env = "STUDY_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "STUDY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "STUDY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "STUDY_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.offline;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    // ── Excerpt-only mode ────────────────────────────────────────────────
    if cli.excerpt_only {
        let excerpt = extract_file(&cli.file)
            .await
            .with_context(|| format!("Failed to extract text from {}", cli.file.display()))?;
        println!("{}", excerpt.text);
        if excerpt.truncated && !cli.quiet {
            eprintln!("{}", dim("(excerpt truncated)"));
        }
        return Ok(());
    }

    // ── Build orchestrator ───────────────────────────────────────────────
    let config = build_config(&cli)?;
    let mut orchestrator =
        SubmissionOrchestrator::from_config(&config).context("Failed to create upload client")?;
    if show_progress {
        orchestrator = orchestrator.with_progress(CliProgressCallback::new() as ProgressCallback);
    }

    let request = request_from_path(&cli.file, cli.audience, cli.purpose)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    if !request.has_file() {
        bail!("{} is empty; choose a lecture file first", cli.file.display());
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let outcome = if cli.offline {
        orchestrator.submit_offline(request)
    } else {
        orchestrator.submit(request).await
    };

    let material = match outcome {
        SubmitOutcome::Succeeded { material, .. } => material,
        SubmitOutcome::Failed { error, .. } => {
            if !show_progress {
                eprintln!("{}", error.notice());
            }
            bail!("Submission failed: {error}");
        }
        SubmitOutcome::Ignored | SubmitOutcome::Superseded { .. } => {
            bail!("Submission produced no result")
        }
    };

    if cli.json {
        let json =
            serde_json::to_string_pretty(material.as_ref()).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print!("{}", render_text(&material));
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().base_url(cli.api_url.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(mode) = cli.mode {
        builder = builder.mode(mode);
    }
    builder.build().context("Invalid configuration")
}

/// Plain-text rendering: summary, sections, glossary, questions.
fn render_text(material: &StudyMaterial) -> String {
    let mut out = String::new();

    if let Some(ref summary) = material.summary {
        out.push_str(&format!("{}\n\n", bold("Summary")));
        if !summary.high_level.is_empty() {
            out.push_str(&format!("{}\n\n", summary.high_level));
        }
        for section in &summary.sections {
            out.push_str(&format!("  {}\n", bold(&section.title)));
            for bullet in &section.bullets {
                out.push_str(&format!("    • {bullet}\n"));
            }
            out.push('\n');
        }
    }

    if !material.terms.is_empty() {
        out.push_str(&format!("{}\n\n", bold("Glossary")));
        for term in &material.terms {
            match term.definition {
                Some(ref d) if !d.is_empty() => out.push_str(&format!("  {} — {d}", term.term)),
                _ => out.push_str(&format!("  {}", term.term)),
            }
            if let Some(ref importance) = term.importance {
                out.push_str(&format!(" {}", dim(&format!("[{importance}]"))));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !material.questions.is_empty() {
        out.push_str(&format!("{}\n\n", bold("Questions")));
        for (i, q) in material.questions.iter().enumerate() {
            let kind = q.kind.as_ref().map(|k| format!(" [{k}]")).unwrap_or_default();
            out.push_str(&format!("  {}.{} {}\n", i + 1, dim(&kind), q.stem));
            for (j, choice) in q.choices.iter().flatten().enumerate() {
                let label = char::from(b'a' + (j % 26) as u8);
                out.push_str(&format!("     {label}) {choice}\n"));
            }
            if let Some(ref answer) = q.answer {
                out.push_str(&format!("     {} {answer}\n", dim("answer:")));
            }
            if let Some(ref rationale) = q.rationale {
                out.push_str(&format!("     {} {rationale}\n", dim("why:")));
            }
        }
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str("No study material was produced for this file.\n");
    }
    out
}
