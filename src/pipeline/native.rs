//! Pure-Rust text extraction via `pdf-extract`.
//!
//! No native library is needed, which makes this the default backend and the
//! one the test-suite exercises. `pdf-extract` can panic on some malformed
//! inputs instead of returning an error; the panic is caught here and
//! reported as [`PdfQaError::InvalidDocument`].
//!
//! A configured password is used to decrypt the document. When the document
//! turns out not to be encrypted the password is ignored; when it is rejected
//! the read fails with [`PdfQaError::WrongPassword`].

use super::{RawPage, TextExtractor};
use crate::config::ExtractorBackend;
use crate::error::PdfQaError;
use std::panic;
use tracing::debug;

/// `pdf-extract` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExtractor;

impl TextExtractor for NativeExtractor {
    fn backend(&self) -> ExtractorBackend {
        ExtractorBackend::Native
    }

    fn read_pages(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<RawPage>, PdfQaError> {
        let plain = || read_guarded(|| pdf_extract::extract_text_from_mem_by_pages(bytes));
        let pages = match password {
            Some(pw) => with_password(
                read_guarded(|| pdf_extract::extract_text_from_mem_by_pages_encrypted(bytes, pw)),
                plain,
            )?,
            None => plain()?,
        };

        if pages.is_empty() {
            return Err(PdfQaError::InvalidDocument {
                detail: "document has no pages".to_string(),
            });
        }

        debug!("pdf-extract returned {} pages", pages.len());
        Ok(pages.into_iter().map(RawPage::from_text).collect())
    }
}

/// Run one `pdf-extract` call, turning both its errors and its panics into
/// [`PdfQaError`]s.
fn read_guarded<F>(read: F) -> Result<Vec<String>, PdfQaError>
where
    F: FnOnce() -> Result<Vec<String>, pdf_extract::OutputError> + panic::UnwindSafe,
{
    match panic::catch_unwind(read) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(classify_error(&e.to_string())),
        Err(_) => Err(PdfQaError::InvalidDocument {
            detail: "parser aborted on malformed input".to_string(),
        }),
    }
}

/// Settle a decrypting read. A document without an /Encrypt dictionary fails
/// to decrypt as malformed and is read again without the password.
fn with_password<F>(
    decrypted: Result<Vec<String>, PdfQaError>,
    plain: F,
) -> Result<Vec<String>, PdfQaError>
where
    F: FnOnce() -> Result<Vec<String>, PdfQaError>,
{
    match decrypted {
        Err(PdfQaError::PasswordRequired) => Err(PdfQaError::WrongPassword),
        Err(PdfQaError::InvalidDocument { detail }) => {
            debug!("Decrypt failed ({}); reading without password", detail);
            plain()
        }
        other => other,
    }
}

/// Map a `pdf-extract` error message onto the error taxonomy.
fn classify_error(message: &str) -> PdfQaError {
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") {
        PdfQaError::PasswordRequired
    } else {
        PdfQaError::InvalidDocument {
            detail: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_errors_ask_for_password() {
        assert!(matches!(
            classify_error("Document is Encrypted"),
            PdfQaError::PasswordRequired
        ));
    }

    #[test]
    fn incorrect_password_message_is_password_error() {
        assert!(matches!(
            classify_error("the supplied password is incorrect"),
            PdfQaError::PasswordRequired
        ));
    }

    #[test]
    fn missing_encrypt_dictionary_is_not_a_password_error() {
        assert!(matches!(
            classify_error("A required dictionary key was not found"),
            PdfQaError::InvalidDocument { .. }
        ));
    }

    #[test]
    fn rejected_password_is_wrong_password() {
        let decrypted = Err(classify_error("the supplied password is incorrect"));
        let err = with_password(decrypted, || panic!("must not retry")).unwrap_err();
        assert!(matches!(err, PdfQaError::WrongPassword));
    }

    #[test]
    fn unencrypted_document_is_read_without_password() {
        let decrypted = Err(classify_error("A required dictionary key was not found"));
        let pages = with_password(decrypted, || Ok(vec!["page".to_string()])).unwrap();
        assert_eq!(pages, vec!["page".to_string()]);
    }

    #[test]
    fn accepted_password_keeps_decrypted_pages() {
        let pages = with_password(Ok(vec!["secret".to_string()]), || panic!("must not retry"))
            .unwrap();
        assert_eq!(pages, vec!["secret".to_string()]);
    }

    #[test]
    fn other_errors_are_invalid_document() {
        let err = classify_error("Invalid cross-reference table");
        assert!(matches!(err, PdfQaError::InvalidDocument { .. }));
        assert!(err.to_string().contains("cross-reference"));
    }

    #[test]
    fn garbage_after_header_is_invalid_document() {
        let err = NativeExtractor
            .read_pages(b"%PDF-1.7\nthis is not really a pdf\n%%EOF", None)
            .unwrap_err();
        assert!(
            matches!(err, PdfQaError::InvalidDocument { .. }),
            "got: {err:?}"
        );
    }
}
