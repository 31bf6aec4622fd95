//! Interactive question-answering session.
//!
//! A [`Session`] owns one uploaded document and walks a small state machine:
//!
//! ```text
//!          upload ok                 ask
//!   Idle ───────────▶ DocumentLoaded ───▶ AnswerPending
//!    ▲                 │  ▲    ▲              │
//!    │     reset       │  │    └── answered ──┘
//!    └─────────────────┘  └── upload ok (replaces document)
//! ```
//!
//! A failed upload or question never changes the state, so the session is
//! always usable after an error.

use crate::config::QaConfig;
use crate::error::PdfQaError;
use crate::extract::{extract_file_with, extract_with};
use crate::output::{ExtractedDocument, QueryResult};
use crate::pipeline::{extractor_for, TextExtractor};
use crate::qa::{LoadedModel, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a [`Session`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No document yet.
    Idle,
    /// A document is loaded and questions can be asked.
    DocumentLoaded,
    /// A question is being answered.
    AnswerPending,
}

/// Serialisable view of a session for `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub document_text: Option<String>,
    pub last_question: Option<String>,
    pub last_answer: Option<QueryResult>,
}

/// One upload plus the questions asked about it.
pub struct Session {
    config: QaConfig,
    registry: Arc<ModelRegistry>,
    extractor: Option<Arc<dyn TextExtractor>>,
    state: SessionState,
    document: Option<ExtractedDocument>,
    last_answer: Option<QueryResult>,
}

impl Session {
    /// Session using the process-wide [`ModelRegistry`].
    pub fn new(config: QaConfig) -> Self {
        Self::with_registry(config, ModelRegistry::global())
    }

    pub fn with_registry(config: QaConfig, registry: Arc<ModelRegistry>) -> Self {
        Self {
            config,
            registry,
            extractor: None,
            state: SessionState::Idle,
            document: None,
            last_answer: None,
        }
    }

    /// Override the configured extraction backend.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&ExtractedDocument> {
        self.document.as_ref()
    }

    pub fn last_answer(&self) -> Option<&QueryResult> {
        self.last_answer.as_ref()
    }

    pub fn last_question(&self) -> Option<&str> {
        self.last_answer.as_ref().map(|r| r.question.as_str())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            document_text: self.document.as_ref().map(|d| d.text.clone()),
            last_question: self.last_question().map(str::to_string),
            last_answer: self.last_answer.clone(),
        }
    }

    /// Load the checkpoint now instead of on the first question.
    pub fn preload_model(&self) -> Result<Arc<LoadedModel>, PdfQaError> {
        self.registry.get_or_load(&self.config)
    }

    /// Extract an uploaded PDF and make it the current document.
    ///
    /// # Errors
    /// Extraction errors, or `EmptyExtraction` when no page has text. The
    /// session is unchanged on error.
    pub async fn upload(&mut self, bytes: &[u8]) -> Result<&ExtractedDocument, PdfQaError> {
        let extractor = self.extractor()?;
        let doc = extract_with(extractor, bytes, &self.config).await?;
        self.accept(doc)
    }

    /// Like [`Session::upload`], reading the PDF from disk.
    pub async fn upload_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<&ExtractedDocument, PdfQaError> {
        let extractor = self.extractor()?;
        let doc = extract_file_with(extractor, path, &self.config).await?;
        self.accept(doc)
    }

    fn extractor(&self) -> Result<Arc<dyn TextExtractor>, PdfQaError> {
        match self.extractor {
            Some(ref ex) => Ok(Arc::clone(ex)),
            None => extractor_for(self.config.extractor),
        }
    }

    fn accept(&mut self, doc: ExtractedDocument) -> Result<&ExtractedDocument, PdfQaError> {
        if doc.is_blank() {
            warn!("Rejecting upload: none of {} page(s) has text", doc.page_count());
            return Err(PdfQaError::EmptyExtraction {
                pages: doc.page_count(),
            });
        }
        info!(
            "Document loaded: {} pages, {} chars",
            doc.stats.total_pages, doc.stats.total_chars
        );
        self.last_answer = None;
        self.state = SessionState::DocumentLoaded;
        let doc = self.document.insert(doc);
        Ok(&*doc)
    }

    /// Answer a question about the current document.
    ///
    /// A result with `answer: None` means no span cleared `min_score`; its
    /// [`QueryResult::display_text`] says so.
    ///
    /// # Errors
    /// - `NoDocumentLoaded` — nothing uploaded yet
    /// - `EmptyQuestion` — blank input; the model is not called
    /// - `ModelLoadFailure`, `InferenceTimeout`, `LlmApiError`
    pub async fn ask(&mut self, question: &str) -> Result<QueryResult, PdfQaError> {
        let context = match (self.state, self.document.as_ref()) {
            (SessionState::Idle, _) | (_, None) => return Err(PdfQaError::NoDocumentLoaded),
            (_, Some(doc)) => doc.text.clone(),
        };
        if question.trim().is_empty() {
            return Err(PdfQaError::EmptyQuestion);
        }

        let model = self.registry.get_or_load(&self.config)?;

        self.state = SessionState::AnswerPending;
        let outcome = model.query(question, &context, &self.config).await;
        self.state = SessionState::DocumentLoaded;

        let result = outcome?;
        self.last_answer = Some(result.clone());
        Ok(result)
    }

    /// Drop the document and any answer.
    pub fn reset(&mut self) {
        self.document = None;
        self.last_answer = None;
        self.state = SessionState::Idle;
    }
}
