//! Text extraction from uploaded receipts and statements
//!
//! Images go through tesseract OCR and PDFs through `pdf-extract`. Both sit
//! behind the `TextExtractor` trait so the server and CLI can be handed a
//! `MockExtractor` in tests.
//!
//! # Configuration
//!
//! Environment variables:
//! - `TALLY_TESSERACT`: path to the tesseract binary (default: `tesseract`)

mod mock;
mod pdf;
mod tesseract;

pub use mock::MockExtractor;
pub use pdf::PdfTextExtractor;
pub use tesseract::TesseractExtractor;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Kind of document an upload holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    /// Detect from a MIME type; `None` for anything that is not an image or PDF
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime == "application/pdf" {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Detect from a file extension (used by the CLI, which has no MIME type)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Turns a stored document into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, kind: DocumentKind, path: &Path) -> Result<String>;
}

/// Production extractor: OCR for images, text layer for PDFs
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    pub image: TesseractExtractor,
    pub pdf: PdfTextExtractor,
}

impl DocumentExtractor {
    pub fn new(image: TesseractExtractor, pdf: PdfTextExtractor) -> Self {
        Self { image, pdf }
    }

    pub fn from_env() -> Self {
        Self::new(TesseractExtractor::from_env(), PdfTextExtractor)
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, kind: DocumentKind, path: &Path) -> Result<String> {
        match kind {
            DocumentKind::Image => self.image.extract_text(kind, path).await,
            DocumentKind::Pdf => self.pdf.extract_text(kind, path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("image/png"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("IMAGE/JPEG"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("text/plain"), None);
        assert_eq!(DocumentKind::from_mime("application/zip"), None);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("scan.JPG")),
            Some(DocumentKind::Image)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("/tmp/statement.pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(DocumentKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_document_extractor_pdf_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let err = DocumentExtractor::default()
            .extract_text(DocumentKind::Pdf, &path)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Extraction error: Failed to extract text from PDF");
    }
}
