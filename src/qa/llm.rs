//! LLM-backed extractive answerer.
//!
//! Any checkpoint other than `"lexical"` names a model served through
//! `edgequake-llm`. The model is asked for a JSON reply holding a span copied
//! from the context; the span is then located in the context to recover its
//! offsets. A span that does not occur in the context is discarded, so the
//! answer is always a substring of the document text.
//!
//! Prompt text lives in [`crate::prompts`].

use super::{AnswerFuture, QuestionAnswerer};
use crate::config::QaConfig;
use crate::error::PdfQaError;
use crate::output::Answer;
use crate::pipeline::postprocess::{clean_answer_span, strip_code_fences};
use crate::prompts::{question_message, DEFAULT_QA_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Answerer that delegates span selection to a chat model.
pub struct LlmAnswerer {
    provider: Arc<dyn LLMProvider>,
    checkpoint: String,
    system_prompt: String,
    options: CompletionOptions,
}

impl LlmAnswerer {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &QaConfig) -> Self {
        Self {
            provider,
            checkpoint: config.checkpoint.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_QA_PROMPT.to_string()),
            options: build_options(config),
        }
    }

    async fn ask(&self, question: &str, context: &str) -> Result<Option<Answer>, PdfQaError> {
        let start = Instant::now();
        let user_text = question_message(question, context);
        let messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(&user_text),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| PdfQaError::LlmApiError {
                message: format!("{}", e),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.checkpoint,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        let (span, confidence) = parse_reply(&response.content);
        if span.is_empty() {
            return Ok(None);
        }

        match locate_span(context, &span) {
            Some((s, e)) => Ok(Some(Answer {
                text: context[s..e].to_string(),
                score: confidence,
                start: context[..s].chars().count(),
                end: context[..e].chars().count(),
            })),
            None => {
                warn!("{}: discarding span not found in context: {:?}", self.checkpoint, span);
                Ok(None)
            }
        }
    }
}

impl QuestionAnswerer for LlmAnswerer {
    fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    fn answer<'a>(&'a self, question: &'a str, context: &'a str) -> AnswerFuture<'a> {
        Box::pin(self.ask(question, context))
    }
}

/// Build `CompletionOptions` from the QA config.
fn build_options(config: &QaConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[derive(Debug, Deserialize)]
struct ModelReply {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parse the model's reply into `(span, confidence)`.
///
/// Accepts the JSON object the prompt asks for, with or without code fences
/// or surrounding chatter. Anything else is taken as a bare span with no
/// confidence.
fn parse_reply(raw: &str) -> (String, Option<f32>) {
    let body = strip_code_fences(raw);
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(a), Some(b)) if a < b => &body[a..=b],
        _ => body.as_str(),
    };

    match serde_json::from_str::<ModelReply>(json) {
        Ok(reply) => (
            clean_answer_span(&reply.answer),
            reply.confidence.map(|c| c.clamp(0.0, 1.0)),
        ),
        Err(e) => {
            debug!("Reply is not JSON ({}); using it as a bare span", e);
            (clean_answer_span(&body), None)
        }
    }
}

/// Byte range of `span` in `context`: exact match first, then an ASCII
/// case-insensitive one. ASCII lowercasing keeps byte offsets stable.
fn locate_span(context: &str, span: &str) -> Option<(usize, usize)> {
    if let Some(s) = context.find(span) {
        return Some((s, s + span.len()));
    }
    let s = context
        .to_ascii_lowercase()
        .find(&span.to_ascii_lowercase())?;
    Some((s, s + span.len()))
}
