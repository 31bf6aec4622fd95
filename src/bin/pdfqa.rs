//! CLI binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate: maps CLI flags to `QaConfig`, loads
//! one PDF into a `Session`, then answers questions given with `-q` or typed
//! at the interactive prompt.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfqa::{
    ExtractedDocument, ExtractorBackend, PageSeparator, PdfQaError, ProgressCallback, QaConfig,
    QueryResult, Session, SessionProgressCallback, SessionSnapshot, DEFAULT_CHECKPOINT,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a page bar while extracting, a spinner while the model
/// answers.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn replace(&self, bar: Option<ProgressBar>) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            *slot = bar;
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(ref bar) = *slot {
                f(bar);
            }
        }
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));
        self.replace(Some(bar));
    }

    fn on_page_extracted(&self, page_num: usize, total_pages: usize, chars: usize) {
        self.with_bar(|bar| {
            if chars == 0 {
                bar.println(format!(
                    "  {} Page {:>3}/{:<3}  {}",
                    yellow("○"),
                    page_num,
                    total_pages,
                    dim("no text layer")
                ));
            }
            bar.inc(1);
        });
    }

    fn on_extraction_complete(&self, total_pages: usize, text_pages: usize) {
        self.replace(None);
        let mark = if text_pages == 0 {
            red("✘")
        } else if text_pages < total_pages {
            cyan("⚠")
        } else {
            green("✔")
        };
        eprintln!(
            "{} {}/{} pages with text",
            mark,
            bold(&text_pages.to_string()),
            total_pages
        );
    }

    fn on_answer_start(&self, _question: &str, windows: usize) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_prefix("Answering");
        bar.set_message(format!("{windows} window(s)…"));
        bar.enable_steady_tick(Duration::from_millis(80));
        self.replace(Some(bar));
    }

    fn on_answer_complete(&self, _question: &str, _found: bool) {
        self.replace(None);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: load a PDF, then type questions (":text" shows the text, ":quit" exits)
  pdfqa report.pdf

  # One-shot questions
  pdfqa report.pdf -q "Who wrote the report?" -q "When was it published?"

  # Fully offline, no API key needed
  pdfqa --checkpoint lexical report.pdf -q "What is the budget?"

  # Use a specific model and provider
  pdfqa --checkpoint claude-sonnet-4-20250514 --provider anthropic report.pdf

  # Print the extracted text with page markers
  pdfqa --show-text --separator marker report.pdf -q "Summary?"

  # JSON output
  pdfqa --json report.pdf -q "Who is the author?" > answer.json

CHECKPOINTS:
  lexical                       offline keyword-overlap answerer
  gpt-4.1-nano (default)        OpenAI, fast and cheap
  gpt-4.1-mini, gpt-4.1         OpenAI, more accurate
  claude-sonnet-4-20250514      Anthropic
  gemini-2.0-flash              Google Gemini
  llama3.2, qwen2.5, …          Ollama / LM Studio (--provider ollama)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Provider used when --provider is not given
  EDGEQUAKE_MODEL         Same as --checkpoint
  EDGEQUAKE_PROVIDER      Same as --provider
  PDFIUM_LIB_PATH         Path to libpdfium for --extractor pdfium
  RUST_LOG                Overrides the log filter
"#;

/// Ask questions about a PDF and get answers quoted from its text.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about a PDF and get answers quoted from its text",
    long_about = "Extract the text of a PDF and answer natural-language questions with spans \
copied from the document. Answers come from an extractive model: the offline lexical \
checkpoint, or any LLM served by OpenAI, Anthropic, Google Gemini, Azure OpenAI, or an \
OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to load.
    input: PathBuf,

    /// Question to answer; repeat for several. Omit for the interactive prompt.
    #[arg(short = 'q', long = "question", env = "PDFQA_QUESTION")]
    questions: Vec<String>,

    /// QA checkpoint: "lexical" or an LLM model id.
    #[arg(
        long,
        env = "EDGEQUAKE_MODEL",
        default_value = DEFAULT_CHECKPOINT,
        long_help = "Model that selects answer spans. \"lexical\" runs offline with no API key.\n\
          Any other value is an LLM model id, e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514."
    )]
    checkpoint: String,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Text extraction backend.
    #[arg(long, env = "PDFQA_EXTRACTOR", value_enum, default_value = "native")]
    extractor: ExtractorArg,

    /// Page separator: newline, none, marker, or custom string.
    #[arg(long, env = "PDFQA_SEPARATOR", default_value = "newline")]
    separator: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFQA_PASSWORD")]
    password: Option<String>,

    /// Print the full extracted text after loading.
    #[arg(long, env = "PDFQA_SHOW_TEXT")]
    show_text: bool,

    /// Output JSON instead of plain text.
    #[arg(long, env = "PDFQA_JSON")]
    json: bool,

    /// Answers scoring below this are reported as not found (0.0–1.0).
    #[arg(long, env = "PDFQA_MIN_SCORE", default_value_t = 0.1)]
    min_score: f32,

    /// Inference timeout per context window in seconds.
    #[arg(long, env = "PDFQA_INFERENCE_TIMEOUT", default_value_t = 60)]
    inference_timeout: u64,

    /// Context window size in characters; longer documents are split.
    #[arg(long, env = "PDFQA_MAX_CONTEXT_CHARS", default_value_t = 4000)]
    max_context_chars: usize,

    /// Characters shared by consecutive context windows.
    #[arg(long, env = "PDFQA_CONTEXT_OVERLAP", default_value_t = 200)]
    context_overlap: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDFQA_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per answer.
    #[arg(long, env = "PDFQA_MAX_TOKENS", default_value_t = 256)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFQA_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Disable progress bar.
    #[arg(long, env = "PDFQA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(long, env = "PDFQA_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ExtractorArg {
    Native,
    Pdfium,
}

impl From<ExtractorArg> for ExtractorBackend {
    fn from(v: ExtractorArg) -> Self {
        match v {
            ExtractorArg::Native => ExtractorBackend::Native,
            ExtractorArg::Pdfium => ExtractorBackend::Pdfium,
        }
    }
}

/// `--json` report for one-shot mode.
#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    stats: &'a edgequake_pdfqa::ExtractionStats,
    page_errors: Vec<&'a edgequake_pdfqa::PageError>,
    results: &'a [QueryResult],
    session: SessionSnapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar covers INFO-level feedback; keep library logs quiet
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SessionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;
    let mut session = Session::new(config);

    // Fail before extraction when the checkpoint cannot be loaded.
    session
        .preload_model()
        .with_context(|| format!("Failed to load checkpoint '{}'", cli.checkpoint))?;

    let doc = session
        .upload_file(&cli.input)
        .await
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    if !cli.quiet && !cli.json {
        print_summary(&cli, doc);
    }
    if cli.show_text && !cli.json {
        print_text(&doc.text)?;
    }

    if cli.questions.is_empty() {
        interactive(&cli, &mut session).await
    } else {
        one_shot(&cli, &mut session).await
    }
}

/// Map CLI args to `QaConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QaConfig> {
    let mut builder = QaConfig::builder()
        .checkpoint(&cli.checkpoint)
        .extractor(cli.extractor.into())
        .page_separator(parse_separator(&cli.separator))
        .min_score(cli.min_score)
        .inference_timeout_secs(cli.inference_timeout)
        .max_context_chars(cli.max_context_chars)
        .context_overlap_chars(cli.context_overlap)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "newline" | "nl" => PageSeparator::Newline,
        "marker" | "page" => PageSeparator::Marker,
        _ => PageSeparator::Custom(s.to_string()),
    }
}

fn print_summary(cli: &Cli, doc: &ExtractedDocument) {
    eprintln!(
        "{} {}  {} pages  {} chars  {}ms  {}",
        cyan("◆"),
        bold(&cli.input.display().to_string()),
        doc.stats.total_pages,
        doc.stats.total_chars,
        doc.stats.duration_ms,
        dim(&format!("[{}]", doc.stats.backend)),
    );
    for page in doc.pages.iter().filter(|p| p.error.is_some()) {
        if let Some(ref e) = page.error {
            eprintln!("  {} {}", yellow("○"), dim(&e.to_string()));
        }
    }
}

fn print_text(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

fn print_result(cli: &Cli, result: &QueryResult) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string(result).context("Failed to serialise answer")?
        );
        return Ok(());
    }

    match result.answer {
        Some(ref a) => {
            println!("{}", a.text);
            if !cli.quiet {
                let score = a
                    .score
                    .map(|s| format!("score {s:.2}"))
                    .unwrap_or_else(|| "no score".to_string());
                eprintln!(
                    "  {}",
                    dim(&format!(
                        "{}  ·  chars {}..{}  ·  {}ms  ·  {}",
                        score, a.start, a.end, result.duration_ms, result.checkpoint
                    ))
                );
            }
        }
        None => println!("{}", yellow(&result.display_text())),
    }
    Ok(())
}

/// Answer every `-q` question, then exit.
async fn one_shot(cli: &Cli, session: &mut Session) -> Result<()> {
    let mut results = Vec::with_capacity(cli.questions.len());
    let mut failed = 0usize;

    for question in &cli.questions {
        match session.ask(question).await {
            Ok(result) => {
                if !cli.json {
                    if !cli.quiet {
                        eprintln!("{} {}", cyan("?"), bold(question));
                    }
                    print_result(cli, &result)?;
                }
                results.push(result);
            }
            Err(e) => {
                failed += usize::from(!e.is_recoverable());
                report_error(question, &e);
            }
        }
    }

    if cli.json {
        if let Some(doc) = session.document() {
            let report = JsonReport {
                file: cli.input.display().to_string(),
                stats: &doc.stats,
                page_errors: doc.pages.iter().filter_map(|p| p.error.as_ref()).collect(),
                results: &results,
                session: session.snapshot(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise output")?
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} question(s) failed", failed, cli.questions.len());
    }
    Ok(())
}

/// Read questions from stdin until `:quit` or end of input.
async fn interactive(cli: &Cli, session: &mut Session) -> Result<()> {
    if !cli.quiet && !cli.json {
        eprintln!(
            "{}",
            dim("Type a question and press Enter. :text shows the document, :quit exits.")
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !cli.json {
            eprint!("{} ", cyan("?"));
            io::stderr().flush().ok();
        }

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let input = line.trim();

        match input {
            ":quit" | ":q" | ":exit" => break,
            ":text" => {
                if let Some(doc) = session.document() {
                    print_text(&doc.text)?;
                }
            }
            ":help" => eprintln!("{}", dim(":text  show extracted text\n:quit  exit")),
            question => match session.ask(question).await {
                Ok(result) => print_result(cli, &result)?,
                Err(e) => report_error(question, &e),
            },
        }
    }
    Ok(())
}

fn report_error(question: &str, e: &PdfQaError) {
    if e.is_recoverable() {
        eprintln!("{} {}", yellow("⚠"), e);
    } else {
        eprintln!("{} {}: {}", red("✘"), bold(question), red(&e.to_string()));
    }
}
