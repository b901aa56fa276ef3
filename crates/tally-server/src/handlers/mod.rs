//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod categories;
pub mod health;
pub mod receipts;
pub mod transactions;

// Re-export all handlers for use in router
pub use auth::*;
pub use categories::*;
pub use health::*;
pub use receipts::*;
pub use transactions::*;

use serde::Serialize;

use crate::AppError;

/// Generic `{ "message": ... }` body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Map a core error to a response, keeping validation messages for the client
pub(crate) fn core_error(err: tally_core::Error) -> AppError {
    use tally_core::Error;

    match err {
        Error::InvalidData(msg) => AppError::bad_request(&msg),
        Error::NotFound(msg) => AppError::not_found(&msg),
        Error::Conflict(msg) => AppError::conflict(&msg),
        other => other.into(),
    }
}

/// Treat a missing or blank form value as absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
