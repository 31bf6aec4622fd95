//! Extractive question answering over extracted document text.
//!
//! ## Data Flow
//!
//! ```text
//! question + context ──▶ validate ──▶ window ──▶ answerer (per window) ──▶ best span
//!                        (blank?)     (overlap)   (lexical | LLM)          (max score)
//! ```
//!
//! 1. [`registry`] — resolve the checkpoint to a [`LoadedModel`], loading it
//!    at most once per process
//! 2. [`window`] — cut long contexts into overlapping windows
//! 3. [`lexical`] / [`llm`] — the [`QuestionAnswerer`] implementations
//!
//! Inference through a [`LoadedModel`] is serialised by a semaphore. Each
//! window's model call is bounded by `QaConfig::inference_timeout_secs`, so a
//! long document gets one budget per window rather than one overall. The
//! `lexical` checkpoint answers synchronously and is never cut short.

pub mod lexical;
pub mod llm;
pub mod registry;
pub mod window;

use crate::config::QaConfig;
use crate::error::PdfQaError;
use crate::output::{Answer, QueryResult};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

pub use registry::{CheckpointLoader, ModelLoader, ModelRegistry};
pub use window::{split_windows, ContextWindow};

/// Future returned by [`QuestionAnswerer::answer`].
pub type AnswerFuture<'a> = BoxFuture<'a, Result<Option<Answer>, PdfQaError>>;

/// An extractive QA model.
///
/// `answer` sees a single window. The returned span must be a substring of
/// `context` with character offsets relative to it; `Ok(None)` means the
/// model found nothing.
pub trait QuestionAnswerer: Send + Sync {
    /// Checkpoint identifier this model was loaded from.
    fn checkpoint(&self) -> &str;

    fn answer<'a>(&'a self, question: &'a str, context: &'a str) -> AnswerFuture<'a>;
}

/// A checkpoint loaded into memory, shared by every caller in the process.
pub struct LoadedModel {
    answerer: Arc<dyn QuestionAnswerer>,
    permits: Semaphore,
}

impl LoadedModel {
    pub fn new(answerer: Arc<dyn QuestionAnswerer>, max_concurrent: usize) -> Self {
        Self {
            answerer,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn checkpoint(&self) -> &str {
        self.answerer.checkpoint()
    }

    /// Answer `question` against `context`.
    ///
    /// `QueryResult::answer` is `None` when no span clears
    /// `config.min_score`; that is not an error.
    ///
    /// # Errors
    /// - `EmptyQuestion` / `EmptyContext` — checked before the model runs
    /// - `InferenceTimeout` — one window's model call exceeded the timeout
    /// - `LlmApiError` — the provider failed
    pub async fn query(
        &self,
        question: &str,
        context: &str,
        config: &QaConfig,
    ) -> Result<QueryResult, PdfQaError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PdfQaError::EmptyQuestion);
        }
        if context.trim().is_empty() {
            return Err(PdfQaError::EmptyContext);
        }

        let windows = split_windows(
            context,
            config.max_context_chars,
            config.context_overlap_chars,
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_answer_start(question, windows.len());
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| PdfQaError::Internal(format!("Inference gate closed: {}", e)))?;

        let start = Instant::now();
        let best = self
            .best_answer(question, &windows, config.inference_timeout_secs)
            .await?;

        let answer = best.filter(|a| {
            !a.text.trim().is_empty() && a.score.map_or(true, |s| s >= config.min_score)
        });
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "{}: answered in {}ms over {} window(s), found={}",
            self.checkpoint(),
            duration_ms,
            windows.len(),
            answer.is_some()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_answer_complete(question, answer.is_some());
        }

        Ok(QueryResult {
            question: question.to_string(),
            answer,
            checkpoint: self.checkpoint().to_string(),
            windows: windows.len(),
            duration_ms,
        })
    }

    /// Highest-ranked span across windows; earlier windows win ties.
    async fn best_answer(
        &self,
        question: &str,
        windows: &[ContextWindow],
        timeout_secs: u64,
    ) -> Result<Option<Answer>, PdfQaError> {
        let limit = Duration::from_secs(timeout_secs);
        let mut best: Option<Answer> = None;
        for (i, w) in windows.iter().enumerate() {
            let reply = tokio::time::timeout(limit, self.answerer.answer(question, &w.text))
                .await
                .map_err(|_| PdfQaError::InferenceTimeout { secs: timeout_secs })??;
            let Some(candidate) = reply else {
                continue;
            };
            let candidate = candidate.shifted(w.start);
            debug!(
                "Window {}: {:?} (score {:?})",
                i + 1,
                candidate.text,
                candidate.score
            );
            if best.as_ref().map_or(true, |b| candidate.rank() > b.rank()) {
                best = Some(candidate);
            }
        }
        Ok(best)
    }
}

/// Answer `question` from `context` with the configured checkpoint.
///
/// The checkpoint is loaded through [`ModelRegistry::global`], so repeated
/// calls share one model.
///
/// # Errors
/// Everything [`LoadedModel::query`] returns, plus `ModelLoadFailure`, and
/// `AnswerNotFound` when no span clears `min_score`.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfqa::{answer_question, QaConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = QaConfig::builder().checkpoint("lexical").build()?;
/// let answer = answer_question(
///     "What is the capital of France?",
///     "The capital of France is Paris.",
///     &config,
/// )
/// .await?;
/// assert_eq!(answer.text, "Paris");
/// # Ok(())
/// # }
/// ```
pub async fn answer_question(
    question: &str,
    context: &str,
    config: &QaConfig,
) -> Result<Answer, PdfQaError> {
    if question.trim().is_empty() {
        return Err(PdfQaError::EmptyQuestion);
    }
    if context.trim().is_empty() {
        return Err(PdfQaError::EmptyContext);
    }
    let model = ModelRegistry::global().get_or_load(config)?;
    let result = model.query(question, context, config).await?;
    result.answer.ok_or_else(|| PdfQaError::AnswerNotFound {
        question: question.trim().to_string(),
    })
}
