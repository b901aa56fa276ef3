//! Receipt and statement upload handlers
//!
//! Uploads are multipart forms. Receipts are kept under the uploads directory
//! (served at `/uploads`); statements only live long enough to be read.

use std::io::Write;
use std::path::{Path, PathBuf};

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    Json,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use tally_core::{
    interpret, parse_transaction_history, DocumentKind, ExtractedReceiptData, StatementLine,
    TextExtractor,
};

use crate::{AppError, AppState};

/// A file received in a multipart form
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub kind: DocumentKind,
    pub data: Bytes,
}

impl Upload {
    /// File extension for storage: the client's, else one derived from the MIME type
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| (1..=5).contains(&e.len()) && e.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name.unwrap_or_else(|| match self.kind {
            DocumentKind::Pdf => "pdf".to_string(),
            DocumentKind::Image => match self.content_type.as_str() {
                "image/jpeg" => "jpg".to_string(),
                other => other
                    .strip_prefix("image/")
                    .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
                    .unwrap_or("img")
                    .to_string(),
            },
        })
    }
}

/// Where an upload was written
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    /// Public URL under `/uploads`
    pub url: String,
}

pub(crate) fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), &err.body_text())
}

/// Read a file field. `Ok(None)` when the field carries no file at all.
///
/// Anything that is not an image or PDF is rejected with `unsupported`.
pub(crate) async fn read_upload(
    field: Field<'_>,
    unsupported: &str,
) -> Result<Option<Upload>, AppError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().unwrap_or_default().to_string();
    let data = field.bytes().await.map_err(multipart_error)?;

    if data.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
        return Ok(None);
    }

    let kind = DocumentKind::from_mime(&content_type)
        .ok_or_else(|| AppError::bad_request(unsupported))?;

    Ok(Some(Upload {
        file_name,
        content_type,
        kind,
        data,
    }))
}

/// Save an upload as `receipt-<millis>-<sha256 prefix>.<ext>`
pub(crate) async fn store_upload(dir: &Path, upload: &Upload) -> Result<StoredUpload, AppError> {
    let digest = format!("{:x}", Sha256::digest(&upload.data));
    let name = format!(
        "receipt-{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        &digest[..12],
        upload.extension()
    );

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&name);
    tokio::fs::write(&path, &upload.data).await?;

    info!(path = %path.display(), bytes = upload.data.len(), "Stored upload");

    Ok(StoredUpload {
        path,
        url: format!("/uploads/{}", name),
    })
}

/// Pull the named file field out of a form, ignoring other fields
async fn find_upload(
    multipart: &mut Multipart,
    field_name: &str,
    unsupported: &str,
) -> Result<Option<Upload>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(field_name) {
            return read_upload(field, unsupported).await;
        }
    }
    Ok(None)
}

#[derive(Debug, Serialize)]
pub struct ProcessReceiptResponse {
    pub message: String,
    pub extracted_text: String,
    pub extracted_data: ExtractedReceiptData,
    pub file_path: String,
}

/// POST /api/transactions/process-receipt - OCR a receipt and guess its fields
///
/// Nothing is saved as a transaction; the guess pre-fills the client's form.
pub async fn process_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessReceiptResponse>, AppError> {
    let upload = find_upload(&mut multipart, "receipt", "Unsupported file type")
        .await?
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    let stored = store_upload(&state.config.uploads_dir, &upload).await?;

    let text = match state.extractor.extract_text(upload.kind, &stored.path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, path = %stored.path.display(), "Receipt extraction failed");
            if let Err(e) = tokio::fs::remove_file(&stored.path).await {
                warn!(error = %e, "Failed to remove unprocessed upload");
            }
            return Err(AppError::internal("Failed to process receipt", e));
        }
    };

    let extracted_data = interpret(&text);

    Ok(Json(ProcessReceiptResponse {
        message: "Receipt processed successfully".to_string(),
        extracted_text: text,
        extracted_data,
        file_path: stored.url,
    }))
}

#[derive(Debug, Serialize)]
pub struct ParseStatementResponse {
    pub message: String,
    pub transactions: Vec<StatementLine>,
}

/// POST /api/transactions/parse-statement - Candidate transactions from a statement
pub async fn parse_statement(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseStatementResponse>, AppError> {
    let upload = find_upload(&mut multipart, "statement", "Unsupported file type")
        .await?
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    let mut scratch = tempfile::Builder::new()
        .prefix("statement-")
        .suffix(&format!(".{}", upload.extension()))
        .tempfile()?;
    scratch.write_all(&upload.data)?;
    scratch.flush()?;

    let text = state
        .extractor
        .extract_text(upload.kind, scratch.path())
        .await
        .map_err(|e| AppError::internal("Failed to parse statement", e))?;

    let transactions = parse_transaction_history(&text);
    info!(count = transactions.len(), "Statement parsed");

    Ok(Json(ParseStatementResponse {
        message: "Statement parsed successfully".to_string(),
        transactions,
    }))
}
