//! Input validation: turn an upload or a local path into trusted PDF bytes.
//!
//! Both backends parse from memory, so every input ends up as a byte
//! buffer. We check the `%PDF-` header before handing bytes to a parser so
//! callers get `InvalidDocument` with the offending magic rather than a
//! parser-specific message (or, with some parsers, a panic).

use crate::error::PdfQaError;
use std::path::Path;
use tracing::debug;

/// Readers must tolerate junk before the header within the first 1024 bytes.
const HEADER_SEARCH_WINDOW: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Read a local PDF fully into memory.
pub async fn read_pdf_file(path: &Path) -> Result<Vec<u8>, PdfQaError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PdfQaError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => PdfQaError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfQaError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    validate_pdf_bytes(&bytes)?;
    Ok(bytes)
}

/// Verify the buffer looks like a PDF.
pub fn validate_pdf_bytes(bytes: &[u8]) -> Result<(), PdfQaError> {
    if bytes.is_empty() {
        return Err(PdfQaError::InvalidDocument {
            detail: "input is empty".to_string(),
        });
    }

    let head = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(());
    }

    let magic: Vec<u8> = bytes.iter().take(4).copied().collect();
    Err(PdfQaError::InvalidDocument {
        detail: format!("missing %PDF header (first bytes: {:?})", magic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_header() {
        assert!(validate_pdf_bytes(b"%PDF-1.7\n%%EOF").is_ok());
    }

    #[test]
    fn accepts_header_after_leading_junk() {
        let mut bytes = vec![b' '; 100];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        assert!(validate_pdf_bytes(&bytes).is_ok());
    }

    #[test]
    fn rejects_non_pdf() {
        let err = validate_pdf_bytes(b"PK\x03\x04 this is a zip").unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidDocument { .. }));
        assert!(err.to_string().contains("%PDF"));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            validate_pdf_bytes(b""),
            Err(PdfQaError::InvalidDocument { .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = read_pdf_file(Path::new("/definitely/not/a/real/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfQaError::FileNotFound { .. }));
    }
}
