//! # edgequake-pdfqa
//!
//! Ask natural-language questions about a PDF and get answers quoted
//! straight from its text.
//!
//! ## How it works
//!
//! A PDF's text layer is extracted page by page and joined in page order.
//! An extractive question-answering model then picks the span of that text
//! that best answers the question. Answers are always substrings of the
//! document, never generated prose.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    read the upload, check the %PDF- header
//!  ├─ 2. Extract  per-page text layer via pdf-extract or pdfium (spawn_blocking)
//!  ├─ 3. Clean    line endings, invisible characters, blank-line runs
//!  ├─ 4. Join     pages in order with the configured separator
//!  ├─ 5. Window   overlapping slices of long documents
//!  └─ 6. Answer   best span across windows (lexical or LLM checkpoint)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{QaConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // "lexical" runs offline; any other checkpoint is an LLM model id
//!     let config = QaConfig::builder().checkpoint("lexical").build()?;
//!     let mut session = Session::new(config);
//!     session.upload_file("document.pdf").await?;
//!     let result = session.ask("Who is the author?").await?;
//!     println!("{}", result.display_text());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `pdfium` | on      | Adds the pdfium extraction backend (needs libpdfium at runtime) |
//!
//! ## Choosing a Checkpoint
//!
//! | Checkpoint | Needs | Best for |
//! |------------|-------|----------|
//! | `lexical` | nothing | Offline use, tests, factoid questions |
//! | `gpt-4.1-nano` | `OPENAI_API_KEY` | Default, fast and cheap |
//! | `gpt-4.1` | `OPENAI_API_KEY` | Highest accuracy |
//! | `claude-sonnet-4-20250514` | `ANTHROPIC_API_KEY` | Long, dense documents |
//! | `gemini-2.0-flash` | `GEMINI_API_KEY` | Alternative cheap option |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod qa;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractorBackend, PageSeparator, QaConfig, QaConfigBuilder, DEFAULT_CHECKPOINT,
    LEXICAL_CHECKPOINT,
};
pub use error::{PageError, PdfQaError};
pub use extract::{extract, extract_file, extract_sync};
pub use output::{
    Answer, ExtractedDocument, ExtractionStats, PageText, QueryResult, NO_CONFIDENT_ANSWER,
};
pub use pipeline::TextExtractor;
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback};
pub use qa::{answer_question, LoadedModel, ModelLoader, ModelRegistry, QuestionAnswerer};
pub use session::{Session, SessionSnapshot, SessionState};
