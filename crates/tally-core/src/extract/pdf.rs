use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{DocumentKind, TextExtractor};
use crate::error::{Error, Result};

/// Reads the text layer of a PDF with `pdf-extract`
///
/// Scanned PDFs without a text layer come back empty; they are not OCR'd.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

fn failed() -> Error {
    Error::Extraction("Failed to extract text from PDF".into())
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, _kind: DocumentKind, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            warn!(error = %e, path = %path.display(), "Failed to read PDF");
            failed()
        })?;

        // pdf-extract is synchronous and can be slow on large documents
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| {
                warn!(error = %e, "PDF extraction task failed");
                failed()
            })?
            .map_err(|e| {
                warn!(error = %e, path = %path.display(), "Failed to parse PDF");
                failed()
            })?;

        debug!(chars = text.len(), "PDF text extracted");
        Ok(text)
    }
}
