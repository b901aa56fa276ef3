//! Mock extractor for testing
//!
//! Lets receipt flows run without tesseract installed or real PDFs on disk.

use std::path::Path;

use async_trait::async_trait;

use super::{DocumentKind, TextExtractor};
use crate::error::{Error, Result};

/// Returns fixed text for any document, or fails when `text` is `None`
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    pub text: Option<String>,
}

impl MockExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// An extractor whose every call fails
    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract_text(&self, kind: DocumentKind, _path: &Path) -> Result<String> {
        self.text.clone().ok_or_else(|| {
            Error::Extraction(match kind {
                DocumentKind::Image => "Failed to extract text from image".into(),
                DocumentKind::Pdf => "Failed to extract text from PDF".into(),
            })
        })
    }
}
