//! Text extraction entry points.
//!
//! Turns PDF bytes into an [`ExtractedDocument`]: one normalised
//! [`PageText`] per page plus the assembled text, in page order. Extraction
//! is a pure function of the bytes and the configured separator.
//!
//! A page without a text layer (a scanned image) is normalised to `""` and
//! tagged with a non-fatal [`PageError`]; only a document that cannot be
//! opened at all is an error here. Whether a document with no text anywhere
//! is acceptable is the caller's decision (the [`crate::session::Session`]
//! rejects it with `EmptyExtraction`).

use crate::config::{PageSeparator, QaConfig};
use crate::error::{PageError, PdfQaError};
use crate::output::{ExtractedDocument, ExtractionStats, PageText};
use crate::pipeline::{extractor_for, input, postprocess, RawPage, TextExtractor};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract the text of an uploaded PDF.
///
/// # Errors
/// - `InvalidDocument` — not a PDF, or the backend cannot parse it
/// - `PasswordRequired` / `WrongPassword` — encrypted document
/// - `PdfiumBindingFailed` — pdfium backend selected but unavailable
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfqa::{extract, QaConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("document.pdf")?;
/// let doc = extract(&bytes, &QaConfig::default()).await?;
/// println!("{} pages, {} chars", doc.stats.total_pages, doc.stats.total_chars);
/// # Ok(())
/// # }
/// ```
pub async fn extract(bytes: &[u8], config: &QaConfig) -> Result<ExtractedDocument, PdfQaError> {
    let extractor = extractor_for(config.extractor)?;
    extract_with(extractor, bytes, config).await
}

/// Extract the text of a local PDF file.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &QaConfig,
) -> Result<ExtractedDocument, PdfQaError> {
    let extractor = extractor_for(config.extractor)?;
    extract_file_with(extractor, path, config).await
}

/// Extract a local PDF file with an explicit backend instance.
pub async fn extract_file_with(
    extractor: Arc<dyn TextExtractor>,
    path: impl AsRef<Path>,
    config: &QaConfig,
) -> Result<ExtractedDocument, PdfQaError> {
    let path = path.as_ref();
    info!("Extracting text from {}", path.display());
    let bytes = input::read_pdf_file(path).await?;
    extract_with(extractor, &bytes, config).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(bytes: &[u8], config: &QaConfig) -> Result<ExtractedDocument, PdfQaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfQaError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(bytes, config))
}

/// Extract with an explicit backend instance.
///
/// The backend runs on the blocking pool; both parsers are synchronous and
/// CPU-bound.
pub async fn extract_with(
    extractor: Arc<dyn TextExtractor>,
    bytes: &[u8],
    config: &QaConfig,
) -> Result<ExtractedDocument, PdfQaError> {
    let start = Instant::now();
    input::validate_pdf_bytes(bytes)?;

    let backend = extractor.backend();
    let owned = bytes.to_vec();
    let password = config.password.clone();

    let raw_pages = tokio::task::spawn_blocking(move || {
        extractor.read_pages(&owned, password.as_deref())
    })
    .await
    .map_err(|e| PdfQaError::Internal(format!("Extraction task failed: {}", e)))??;

    let total_pages = raw_pages.len();
    info!("Read {} pages with the {} extractor", total_pages, backend);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total_pages);
    }

    let pages: Vec<PageText> = raw_pages
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let page = normalise_page(idx + 1, raw);
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_extracted(page.page_num, total_pages, page.text.chars().count());
            }
            page
        })
        .collect();

    let text = assemble_text(&pages, &config.page_separator);
    let text_pages = pages.iter().filter(|p| !p.is_empty()).count();

    let stats = ExtractionStats {
        total_pages,
        text_pages,
        empty_pages: total_pages - text_pages,
        total_chars: text.chars().count(),
        duration_ms: start.elapsed().as_millis() as u64,
        backend,
    };

    info!(
        "Extraction complete: {}/{} pages with text, {} chars, {}ms",
        text_pages, total_pages, stats.total_chars, stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(total_pages, text_pages);
    }

    Ok(ExtractedDocument { pages, text, stats })
}

/// Normalise one backend page into a [`PageText`].
///
/// Missing or unreadable text becomes `""`, never a null.
fn normalise_page(page_num: usize, raw: RawPage) -> PageText {
    match raw {
        RawPage::Text(t) => {
            let text = postprocess::clean_page_text(&t);
            let error = if text.is_empty() {
                Some(PageError::NoTextLayer { page: page_num })
            } else {
                None
            };
            PageText {
                page_num,
                text,
                error,
            }
        }
        RawPage::Missing => {
            debug!("Page {} has no text layer", page_num);
            PageText {
                page_num,
                text: String::new(),
                error: Some(PageError::NoTextLayer { page: page_num }),
            }
        }
        RawPage::Failed(detail) => PageText {
            page_num,
            text: String::new(),
            error: Some(PageError::TextReadFailed {
                page: page_num,
                detail,
            }),
        },
    }
}

/// Join page texts in page order with the separator between consecutive pages.
pub fn assemble_text(pages: &[PageText], separator: &PageSeparator) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator.render(page.page_num));
        }
        out.push_str(&page.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, text: &str) -> PageText {
        PageText {
            page_num: n,
            text: text.to_string(),
            error: None,
        }
    }

    #[test]
    fn assemble_keeps_page_order() {
        let pages = vec![page(1, "alpha"), page(2, "beta"), page(3, "gamma")];
        assert_eq!(
            assemble_text(&pages, &PageSeparator::Newline),
            "alpha\nbeta\ngamma"
        );
        assert_eq!(assemble_text(&pages, &PageSeparator::None), "alphabetagamma");
    }

    #[test]
    fn assemble_marker_numbers_following_page() {
        let pages = vec![page(1, "a"), page(2, "b")];
        assert_eq!(
            assemble_text(&pages, &PageSeparator::Marker),
            "a\n\n--- page 2 ---\n\nb"
        );
    }

    #[test]
    fn assemble_single_page_has_no_separator() {
        let pages = vec![page(1, "only")];
        assert_eq!(assemble_text(&pages, &PageSeparator::Marker), "only");
        assert_eq!(assemble_text(&[], &PageSeparator::Newline), "");
    }

    #[test]
    fn missing_page_normalises_to_empty_string() {
        let p = normalise_page(4, RawPage::Missing);
        assert_eq!(p.text, "");
        assert_eq!(p.error, Some(PageError::NoTextLayer { page: 4 }));
    }

    #[test]
    fn failed_page_keeps_detail() {
        let p = normalise_page(2, RawPage::Failed("bad font".into()));
        assert_eq!(p.text, "");
        assert!(matches!(p.error, Some(PageError::TextReadFailed { page: 2, .. })));
    }

    #[test]
    fn text_page_is_cleaned() {
        let p = normalise_page(1, RawPage::Text("\r\nHello  \r\n".into()));
        assert_eq!(p.text, "Hello");
        assert!(p.error.is_none());
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_invalid_document() {
        let err = extract(b"just some text", &QaConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidDocument { .. }));
    }

    struct FixedExtractor(Vec<RawPage>);

    impl TextExtractor for FixedExtractor {
        fn backend(&self) -> crate::config::ExtractorBackend {
            crate::config::ExtractorBackend::Native
        }

        fn read_pages(
            &self,
            _bytes: &[u8],
            _password: Option<&str>,
        ) -> Result<Vec<RawPage>, PdfQaError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn extract_with_counts_empty_pages() {
        let ex = Arc::new(FixedExtractor(vec![
            RawPage::Text("Page one".into()),
            RawPage::Missing,
            RawPage::Text("Page three".into()),
        ]));
        let doc = extract_with(ex, b"%PDF-1.7\n", &QaConfig::default())
            .await
            .unwrap();
        assert_eq!(doc.text, "Page one\n\nPage three");
        assert_eq!(doc.stats.total_pages, 3);
        assert_eq!(doc.stats.text_pages, 2);
        assert_eq!(doc.stats.empty_pages, 1);
        assert_eq!(doc.pages[1].text, "");
    }
}
