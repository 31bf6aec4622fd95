//! Result types: extracted documents, answers, and query results.
//!
//! Everything here is plain data with `Serialize`/`Deserialize` so the CLI's
//! `--json` mode and library callers see the same shapes.

use crate::config::ExtractorBackend;
use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// Text extracted from one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Normalised page text. Empty when the page has no text layer; never null.
    pub text: String,
    /// Why the page produced no text, if it didn't.
    pub error: Option<PageError>,
}

impl PageText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Summary numbers for one extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages that yielded text.
    pub text_pages: usize,
    /// Pages normalised to an empty string.
    pub empty_pages: usize,
    /// Characters (Unicode scalar values) in the assembled text.
    pub total_chars: usize,
    /// Wall-clock extraction time.
    pub duration_ms: u64,
    /// Backend that produced the text.
    pub backend: ExtractorBackend,
}

/// A PDF's text, page by page and assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Page texts in page order.
    pub pages: Vec<PageText>,
    /// Page texts joined with the configured separator, in page order.
    pub text: String,
    pub stats: ExtractionStats,
}

impl ExtractedDocument {
    /// `true` when no page produced any text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// The span a model selected as the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer span, copied verbatim from the context.
    pub text: String,
    /// Model confidence in `[0, 1]`, when the model exposes one.
    pub score: Option<f32>,
    /// Start offset into the context, in characters.
    pub start: usize,
    /// End offset (exclusive) into the context, in characters.
    pub end: usize,
}

impl Answer {
    /// Score used for ranking; a missing score ranks as zero.
    pub fn rank(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }

    /// Shift offsets by `by` characters (window start inside the full context).
    pub fn shifted(mut self, by: usize) -> Self {
        self.start += by;
        self.end += by;
        self
    }
}

/// One question put to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    /// `None` when the model found no confident answer.
    pub answer: Option<Answer>,
    /// Checkpoint that answered.
    pub checkpoint: String,
    /// Context windows examined.
    pub windows: usize,
    pub duration_ms: u64,
}

impl QueryResult {
    /// Text to show the user: the answer, or an explicit "no confident
    /// answer" message instead of an empty string.
    pub fn display_text(&self) -> String {
        match &self.answer {
            Some(a) if !a.text.trim().is_empty() => a.text.clone(),
            _ => NO_CONFIDENT_ANSWER.to_string(),
        }
    }
}

/// Shown in place of an empty or low-confidence answer.
pub const NO_CONFIDENT_ANSWER: &str = "No confident answer found in the document.";

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(answer: Option<Answer>) -> QueryResult {
        QueryResult {
            question: "Who?".into(),
            answer,
            checkpoint: "lexical".into(),
            windows: 1,
            duration_ms: 3,
        }
    }

    #[test]
    fn display_text_uses_answer_span() {
        let r = result_with(Some(Answer {
            text: "Paris".into(),
            score: Some(0.9),
            start: 25,
            end: 30,
        }));
        assert_eq!(r.display_text(), "Paris");
    }

    #[test]
    fn display_text_never_empty() {
        assert_eq!(result_with(None).display_text(), NO_CONFIDENT_ANSWER);
        let blank = result_with(Some(Answer {
            text: "  ".into(),
            score: Some(0.5),
            start: 0,
            end: 2,
        }));
        assert_eq!(blank.display_text(), NO_CONFIDENT_ANSWER);
    }

    #[test]
    fn shifted_moves_both_offsets() {
        let a = Answer {
            text: "x".into(),
            score: None,
            start: 3,
            end: 4,
        }
        .shifted(100);
        assert_eq!((a.start, a.end), (103, 104));
        assert_eq!(a.rank(), 0.0);
    }

    #[test]
    fn query_result_serialises() {
        let json = serde_json::to_string(&result_with(None)).unwrap();
        assert!(json.contains("\"answer\":null"));
    }
}
