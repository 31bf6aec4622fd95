//! Text extraction via Google's pdfium (`pdfium-render`).
//!
//! pdfium copes with unusual font encodings and damaged cross-reference
//! tables better than the pure-Rust parser, and it supports user passwords.
//! The shared library is located through `PDFIUM_LIB_PATH`, falling back to
//! the system library search path.
//!
//! pdfium keeps thread-local state and is not async-safe; callers run
//! [`PdfiumExtractor::read_pages`] inside `spawn_blocking`.

use super::{RawPage, TextExtractor};
use crate::config::ExtractorBackend;
use crate::error::PdfQaError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// `pdfium-render` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumExtractor;

impl TextExtractor for PdfiumExtractor {
    fn backend(&self) -> ExtractorBackend {
        ExtractorBackend::Pdfium
    }

    fn read_pages(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<RawPage>, PdfQaError> {
        let pdfium = bind_pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        PdfQaError::WrongPassword
                    } else {
                        PdfQaError::PasswordRequired
                    }
                } else {
                    PdfQaError::InvalidDocument { detail: err_str }
                }
            })?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(PdfQaError::InvalidDocument {
                detail: "document has no pages".to_string(),
            });
        }
        info!("PDF loaded: {} pages", pages.len());

        let mut results = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let raw = match page.text() {
                Ok(text) => RawPage::from_text(text.all()),
                Err(e) => {
                    warn!("Page {}: text layer unreadable: {:?}", idx + 1, e);
                    RawPage::Failed(format!("{:?}", e))
                }
            };
            if raw == RawPage::Missing {
                debug!("Page {}: no text layer", idx + 1);
            }
            results.push(raw);
        }

        Ok(results)
    }
}

/// Bind to libpdfium: `PDFIUM_LIB_PATH` first, then the system library.
fn bind_pdfium() -> Result<Pdfium, PdfQaError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(p);
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PdfQaError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
