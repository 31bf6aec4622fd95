//! Error types for the edgequake-pdfqa library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfQaError`] — **Fatal for the current request**: the upload or the
//!   question cannot be served (not a PDF, checkpoint unavailable, blank
//!   question). Returned as `Err(PdfQaError)`; it never takes the process
//!   down, and a [`crate::session::Session`] stays usable afterwards.
//!
//! * [`PageError`] — **Non-fatal**: a single page yielded no text (scanned
//!   image, unreadable text layer). Stored on [`crate::output::PageText`]
//!   next to the normalised empty string so callers can report it.

use std::path::PathBuf;
use thiserror::Error;

/// All request-level errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Bytes are not a PDF, or the parser rejected them.
    #[error("Invalid PDF document: {detail}")]
    InvalidDocument { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// The PDF parsed but no page carries a text layer.
    #[error(
        "No extractable text in {pages} page(s).\n\
The document is probably scanned images without an OCR layer."
    )]
    EmptyExtraction { pages: usize },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, install pdfium system-wide,\n\
or use the built-in extractor with --extractor native.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The QA checkpoint could not be loaded (unknown name, provider not
    /// configured, missing API key …).
    #[error("Model checkpoint '{checkpoint}' could not be loaded.\n{reason}")]
    ModelLoadFailure { checkpoint: String, reason: String },

    /// The model provider returned an error while answering.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// Inference did not finish within the configured timeout.
    #[error("Inference timed out after {secs}s\nIncrease --inference-timeout or shorten the document.")]
    InferenceTimeout { secs: u64 },

    // ── Question errors ───────────────────────────────────────────────────
    /// The user submitted a blank question.
    #[error("Please enter a question.")]
    EmptyQuestion,

    /// The answerer was handed a blank context.
    #[error("Cannot answer against an empty context")]
    EmptyContext,

    /// The model found no span above the confidence threshold.
    #[error("No confident answer found for: '{question}'")]
    AnswerNotFound { question: String },

    /// A question was asked before any document was loaded.
    #[error("No document loaded.\nUpload a PDF before asking questions.")]
    NoDocumentLoaded,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfQaError {
    /// `true` for errors a user fixes by changing their input rather than
    /// the environment (blank question, no document yet, nothing found).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PdfQaError::EmptyQuestion
                | PdfQaError::NoDocumentLoaded
                | PdfQaError::AnswerNotFound { .. }
        )
    }
}

/// A non-fatal error for a single page.
///
/// The page's text is normalised to `""` and extraction continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page has no text layer (scanned image, vector-only drawing).
    #[error("Page {page}: no text layer")]
    NoTextLayer { page: usize },

    /// Backend failed to read the page's text layer.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextReadFailed { page: usize, detail: String },
}
