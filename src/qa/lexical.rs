//! Offline extractive answerer (checkpoint `"lexical"`).
//!
//! Picks the sentence sharing the most content words with the question, then
//! narrows it to the longest run of words the question does not already
//! contain, which for factoid questions is usually the answer itself:
//!
//! ```text
//! Q: What is the capital of France?     terms: {capital, france}
//! S: The capital of France is Paris.    overlap 2/2 → score 1.0
//!                             ^^^^^     span: "Paris"
//! ```
//!
//! Deterministic and dependency-free, so it doubles as the test-suite's
//! model and as a fallback when no LLM provider is configured.

use super::{AnswerFuture, QuestionAnswerer};
use crate::config::LEXICAL_CHECKPOINT;
use crate::output::Answer;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’\-]*").unwrap());

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "being", "but", "by", "can", "could", "did", "do", "does", "during", "for", "from",
    "had", "has", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "many", "may", "me", "might", "much", "my", "name", "no", "not", "of", "on", "or", "our",
    "shall", "she", "should", "so", "than", "that", "the", "their", "them", "there", "these",
    "they", "this", "those", "to", "was", "we", "were", "what", "when", "where", "which", "who",
    "whom", "whose", "why", "will", "with", "would", "you", "your",
];

/// Lexical-overlap answerer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalAnswerer;

impl QuestionAnswerer for LexicalAnswerer {
    fn checkpoint(&self) -> &str {
        LEXICAL_CHECKPOINT
    }

    fn answer<'a>(&'a self, question: &'a str, context: &'a str) -> AnswerFuture<'a> {
        Box::pin(futures::future::ready(Ok(answer_span(question, context))))
    }
}

/// A word with its byte range in the source text.
#[derive(Debug, Clone, Copy)]
struct Word<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

fn words(text: &str) -> Vec<Word<'_>> {
    RE_WORD
        .find_iter(text)
        .map(|m| Word {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Lowercase, drop a possessive, and fold a plain plural `-s`.
fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    let lower = lower
        .strip_suffix("'s")
        .or_else(|| lower.strip_suffix("’s"))
        .unwrap_or(&lower)
        .to_string();
    if lower.chars().count() > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
        lower[..lower.len() - 1].to_string()
    } else {
        lower
    }
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// Content terms of the question.
fn question_terms(question: &str) -> HashSet<String> {
    words(question)
        .into_iter()
        .filter(|w| !is_stopword(w.text))
        .map(|w| stem(w.text))
        .collect()
}

/// Split into sentences, returned as trimmed byte ranges.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace (or the end of
/// text), or at a blank line. Single newlines are line wraps, not breaks.
fn sentences(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        let next = iter.peek().map(|&(_, n)| n);
        let boundary = match c {
            '.' | '!' | '?' => next.map_or(true, char::is_whitespace),
            '\n' => next == Some('\n'),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            push_trimmed(text, start, end, &mut out);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut out);
    out
}

fn push_trimmed(text: &str, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    if lead + trail < slice.len() {
        out.push((start + lead, end - trail));
    }
}

/// Best span for `question` in `context`, or `None` when no sentence shares
/// a content word with the question.
pub(crate) fn answer_span(question: &str, context: &str) -> Option<Answer> {
    let terms = question_terms(question);
    if terms.is_empty() {
        return None;
    }

    let mut best: Option<(usize, (usize, usize))> = None;
    for (s, e) in sentences(context) {
        let found: HashSet<String> = words(&context[s..e])
            .into_iter()
            .map(|w| stem(w.text))
            .filter(|t| terms.contains(t))
            .collect();
        let overlap = found.len();
        if overlap > 0 && best.map_or(true, |(b, _)| overlap > b) {
            best = Some((overlap, (s, e)));
        }
    }

    let (overlap, (s, e)) = best?;
    let (span_start, span_end) = narrow(&context[s..e], &terms)
        .map(|(a, b)| (s + a, s + b))
        .unwrap_or((s, e));

    Some(Answer {
        text: context[span_start..span_end].to_string(),
        score: Some(overlap as f32 / terms.len() as f32),
        start: context[..span_start].chars().count(),
        end: context[..span_end].chars().count(),
    })
}

/// Longest run of words not mentioned by the question, as a byte range in
/// `sentence`.
///
/// A run starts and ends on a new word; stopwords may sit inside it
/// ("Bank of England"), question terms end it. Earlier runs win ties.
fn narrow(sentence: &str, terms: &HashSet<String>) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    let mut current: Option<(usize, usize, usize)> = None;

    let close = |run: Option<(usize, usize, usize)>, best: &mut Option<(usize, usize, usize)>| {
        if let Some(r) = run {
            if best.map_or(true, |b| r.2 > b.2) {
                *best = Some(r);
            }
        }
    };

    for w in words(sentence) {
        if terms.contains(&stem(w.text)) {
            close(current.take(), &mut best);
        } else if is_stopword(w.text) {
            continue;
        } else {
            current = Some(match current {
                Some((start, _, n)) => (start, w.end, n + 1),
                None => (w.start, w.end, 1),
            });
        }
    }
    close(current.take(), &mut best);

    best.map(|(start, end, _)| (start, end))
}
