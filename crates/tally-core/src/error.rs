//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// User-supplied data failed validation. The message is safe to show to clients.
    #[error("{0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated. The message is safe to show to clients.
    #[error("{0}")]
    Conflict(String),

    /// OCR or PDF text extraction failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Password error: {0}")]
    Password(String),
}

pub type Result<T> = std::result::Result<T, Error>;
