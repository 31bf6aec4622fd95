//! Post-processing: deterministic cleanup of extracted page text and of
//! model replies.
//!
//! PDF text layers carry artefacts that are invisible on screen but hurt
//! span selection: Windows line endings, zero-width spaces and soft hyphens
//! from typesetting, trailing blanks on every line, and runs of empty lines
//! where the layout had whitespace. Each rule below is a pure
//! `&str → String` pass, independently testable.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule only sees `\n`;
//! invisible characters go before whitespace trimming so a line holding only
//! a zero-width space becomes blank and collapses.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all page-text rules to one page's raw text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Replace NUL and other control characters (except `\n`, `\t`) with spaces
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Trim leading and trailing blank lines
///
/// A page with no text layer comes out as `""`.
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = replace_control_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    trim_blank_edges(&s)
}

/// Strip an outer code fence a model wrapped around its reply.
///
/// Models asked for bare JSON still answer with ```` ```json … ``` ```` now
/// and then.
pub fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].trim().to_string()
    } else {
        input.trim().to_string()
    }
}

/// Trim whitespace and surrounding quotes from an answer span.
pub fn clean_answer_span(input: &str) -> String {
    input
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Replace control characters ──────────────────────────────────────

fn replace_control_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                ' '
            } else {
                c
            }
        })
        .collect()
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 6: Trim blank edges ────────────────────────────────────────────────

fn trim_blank_edges(input: &str) -> String {
    input.trim_matches('\n').to_string()
}

// ── Model replies ───────────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```\s*$").unwrap());

// ── Tests ────────────────────────────────────────────────────────────────────
