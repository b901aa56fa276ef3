//! OCR through the tesseract command-line tool

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{DocumentKind, TextExtractor};
use crate::error::{Error, Result};

const DEFAULT_BINARY: &str = "tesseract";
const DEFAULT_LANGUAGE: &str = "eng";

/// Runs `tesseract <image> stdout -l <language>` and captures stdout
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    pub binary: String,
    pub language: String,
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl TesseractExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    /// Binary from `TALLY_TESSERACT`, falling back to `tesseract` on the PATH
    pub fn from_env() -> Self {
        match std::env::var("TALLY_TESSERACT") {
            Ok(binary) if !binary.trim().is_empty() => Self::new(binary.trim()),
            _ => Self::default(),
        }
    }

    fn failed() -> Error {
        Error::Extraction("Failed to extract text from image".into())
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, _kind: DocumentKind, path: &Path) -> Result<String> {
        debug!(path = %path.display(), binary = %self.binary, "Running OCR");

        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| {
                warn!(error = %e, binary = %self.binary, "Failed to start tesseract");
                Self::failed()
            })?;

        if !output.status.success() {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "tesseract exited with an error"
            );
            return Err(Self::failed());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}
