//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations (users, categories, transactions)
//! - Receipt text interpretation (amount, description, category guesses)
//! - Bank statement line parsing
//! - Pluggable text extraction (tesseract OCR, PDF text)
//! - Password hashing for user accounts

pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod password;
pub mod receipt;
pub mod statement;

pub use db::Database;
pub use error::{Error, Result};
pub use extract::{
    DocumentExtractor, DocumentKind, MockExtractor, PdfTextExtractor, TesseractExtractor,
    TextExtractor,
};
pub use password::{PasswordHash, ValidatedPassword};
pub use receipt::{interpret, ExtractedReceiptData};
pub use statement::{parse_transaction_history, StatementLine};
