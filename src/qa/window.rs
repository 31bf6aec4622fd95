//! Context windowing for long documents.
//!
//! Extractive models read a bounded context. A whole book does not fit, so
//! the document is cut into overlapping windows, each answered on its own;
//! the overlap makes sure a span near a cut is fully inside at least one
//! window. Offsets are in characters so they line up with [`crate::Answer`].

/// A slice of the context handed to the model in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    /// Character offset of the window's first character in the full context.
    pub start: usize,
    pub text: String,
}

/// Split `context` into windows of at most `max_chars` characters, with
/// consecutive windows sharing `overlap` characters.
///
/// Cuts prefer the last whitespace in the second half of a window so words
/// are not split. A context that fits yields exactly one window.
pub fn split_windows(context: &str, max_chars: usize, overlap: usize) -> Vec<ContextWindow> {
    let chars: Vec<char> = context.chars().collect();
    let total = chars.len();
    let max_chars = max_chars.max(1);
    let overlap = overlap.min(max_chars.saturating_sub(1));

    if total <= max_chars {
        return vec![ContextWindow {
            start: 0,
            text: context.to_string(),
        }];
    }

    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let hard_end = (start + max_chars).min(total);
        let end = if hard_end < total {
            let floor = start + max_chars / 2;
            (floor..hard_end)
                .rev()
                .find(|&i| chars[i].is_whitespace())
                .map(|i| i + 1)
                .unwrap_or(hard_end)
        } else {
            hard_end
        };

        windows.push(ContextWindow {
            start,
            text: chars[start..end].iter().collect(),
        });

        if end >= total {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    windows
}
