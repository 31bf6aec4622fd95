//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step, so backends can be swapped
//! without touching validation or cleanup.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ backend ──▶ postprocess ──▶ assemble
//! (bytes)   (native | pdfium)  (cleanup)     (separator)
//! ```
//!
//! 1. [`input`]  — read the upload / local file and check the `%PDF-` header
//! 2. [`native`] or [`pdfium`] — read each page's text layer; runs in
//!    `spawn_blocking` because both parsers are synchronous and CPU-bound
//! 3. [`postprocess`] — deterministic text-cleanup rules
//!
//! Assembly lives in [`crate::extract`].

pub mod input;
pub mod native;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod postprocess;

use crate::config::ExtractorBackend;
use crate::error::PdfQaError;
use std::sync::Arc;

/// What a backend found on one page, before normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPage {
    /// The page's text layer.
    Text(String),
    /// The page has no text layer (or it is blank).
    Missing,
    /// The backend failed on this page only.
    Failed(String),
}

impl RawPage {
    /// Classify a backend's text for one page; blank text counts as missing.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            RawPage::Missing
        } else {
            RawPage::Text(text)
        }
    }
}

/// A PDF text-layer backend.
///
/// Implementations are synchronous; callers run them on the blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Which backend this is, for stats and logging.
    fn backend(&self) -> ExtractorBackend;

    /// Read every page of the document, in page order.
    ///
    /// Returns `Err` only when the document as a whole cannot be opened.
    fn read_pages(&self, bytes: &[u8], password: Option<&str>)
        -> Result<Vec<RawPage>, PdfQaError>;
}

/// Instantiate the configured backend.
pub fn extractor_for(backend: ExtractorBackend) -> Result<Arc<dyn TextExtractor>, PdfQaError> {
    match backend {
        ExtractorBackend::Native => Ok(Arc::new(native::NativeExtractor)),
        #[cfg(feature = "pdfium")]
        ExtractorBackend::Pdfium => Ok(Arc::new(pdfium::PdfiumExtractor)),
        #[cfg(not(feature = "pdfium"))]
        ExtractorBackend::Pdfium => Err(PdfQaError::InvalidConfig(
            "the pdfium extractor is not compiled in; rebuild with --features pdfium".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(RawPage::from_text("  \n ".into()), RawPage::Missing);
        assert_eq!(
            RawPage::from_text("Hello".into()),
            RawPage::Text("Hello".into())
        );
    }

    #[test]
    fn native_backend_always_available() {
        let ex = extractor_for(ExtractorBackend::Native).unwrap();
        assert_eq!(ex.backend(), ExtractorBackend::Native);
    }
}
