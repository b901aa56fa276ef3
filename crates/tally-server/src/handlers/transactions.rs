//! Transaction and stats handlers

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tally_core::models::{
    parse_date, DateRange, NewTransaction, Transaction, TransactionStats, TransactionType, User,
};

use super::receipts::{multipart_error, read_upload, store_upload};
use super::{core_error, non_blank, MessageResponse};
use crate::{AppError, AppState};

/// Fields of a new transaction, from JSON or a multipart form
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// A number in JSON, a string in forms
    pub amount: Option<serde_json::Value>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl TransactionForm {
    fn set_text_field(&mut self, name: &str, value: String) {
        match name {
            "type" => self.transaction_type = Some(value),
            "amount" => self.amount = Some(serde_json::Value::String(value)),
            "category" => self.category = Some(value),
            "description" => self.description = Some(value),
            "date" => self.date = Some(value),
            _ => debug!(field = name, "Ignoring unknown form field"),
        }
    }

    fn amount(&self) -> Option<Result<f64, AppError>> {
        let invalid = || AppError::bad_request("Amount must be a number");
        match self.amount.as_ref()? {
            serde_json::Value::Number(n) => Some(n.as_f64().ok_or_else(invalid)),
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(s.trim().parse::<f64>().map_err(|_| invalid()))
            }
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            _ => Some(Err(invalid())),
        }
    }

    /// Validate into a `NewTransaction`
    fn into_new_transaction(self) -> Result<NewTransaction, AppError> {
        let required = || AppError::bad_request("Type, amount, category, and date are required");

        let transaction_type = non_blank(&self.transaction_type).ok_or_else(required)?;
        let amount = self.amount().ok_or_else(required)??;
        let category = non_blank(&self.category).ok_or_else(required)?;
        let date = non_blank(&self.date).ok_or_else(required)?;

        let transaction_type: TransactionType = transaction_type
            .parse()
            .map_err(|_| AppError::bad_request("Type must be income or expense"))?;
        let date = parse_date(date).map_err(core_error)?;

        NewTransaction::new(
            transaction_type,
            amount,
            category,
            self.description.as_deref(),
            date,
        )
        .map_err(core_error)
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionCreatedResponse {
    pub message: String,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// POST /api/transactions - Add a transaction
///
/// Accepts a JSON body, or a multipart form with an optional `receipt` file
/// (images and PDFs only) that is stored alongside the transaction.
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    request: Request,
) -> Result<(StatusCode, Json<TransactionCreatedResponse>), AppError> {
    let (form, receipt) = if is_multipart(&request) {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::bad_request(&e.body_text()))?;

        let mut form = TransactionForm::default();
        let mut receipt = None;
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "receipt" {
                receipt = read_upload(field, "Only images and PDF files are allowed").await?;
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.set_text_field(&name, value);
            }
        }
        (form, receipt)
    } else {
        let Json(form) = Json::<TransactionForm>::from_request(request, &state)
            .await
            .map_err(|e| AppError::bad_request(&e.body_text()))?;
        (form, None)
    };

    let mut new_tx = form.into_new_transaction()?;

    if let Some(upload) = receipt {
        let stored = store_upload(&state.config.uploads_dir, &upload).await?;
        new_tx = new_tx.with_receipt_path(stored.url);
    }

    let transaction = state.db.create_transaction(user.id, &new_tx)?;

    info!(
        user_id = user.id,
        transaction_id = transaction.id,
        "Transaction added"
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreatedResponse {
            message: "Transaction added successfully".to_string(),
            transaction,
        }),
    ))
}

/// GET /api/transactions - The user's transactions, newest first
///
/// `start_date` and `end_date` filter inclusively, but only when both are given.
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let range = match (non_blank(&query.start_date), non_blank(&query.end_date)) {
        (Some(from), Some(to)) => Some(DateRange {
            from: parse_date(from).map_err(core_error)?,
            to: parse_date(to).map_err(core_error)?,
        }),
        _ => None,
    };

    let transactions = state.db.list_transactions(user.id, range)?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// DELETE /api/transactions/:id - Delete one of the user's transactions
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_transaction(user.id, id)? {
        return Err(AppError::not_found("Transaction not found"));
    }

    info!(user_id = user.id, transaction_id = id, "Transaction deleted");
    Ok(Json(MessageResponse::new("Transaction deleted successfully")))
}

/// GET /api/transactions/stats - Category and monthly totals
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<TransactionStats>, AppError> {
    Ok(Json(state.db.transaction_stats(user.id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_all_fields() {
        let form = TransactionForm {
            transaction_type: Some("expense".into()),
            amount: Some(serde_json::json!(12.5)),
            category: None,
            description: None,
            date: Some("2024-01-01".into()),
        };
        let err = form.into_new_transaction().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_form_accepts_string_amount() {
        let mut form = TransactionForm::default();
        form.set_text_field("type", "income".into());
        form.set_text_field("amount", " 1500.25 ".into());
        form.set_text_field("category", "Salary".into());
        form.set_text_field("date", "2024-02-01".into());
        form.set_text_field("unknown", "ignored".into());

        let tx = form.into_new_transaction().unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.amount, 1500.25);
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_form_rejects_bad_amount_and_type() {
        let mut form = TransactionForm::default();
        form.set_text_field("type", "expense".into());
        form.set_text_field("amount", "twelve".into());
        form.set_text_field("category", "Food".into());
        form.set_text_field("date", "2024-02-01".into());
        assert!(form.into_new_transaction().is_err());

        let mut form = TransactionForm::default();
        form.set_text_field("type", "transfer".into());
        form.set_text_field("amount", "12".into());
        form.set_text_field("category", "Food".into());
        form.set_text_field("date", "2024-02-01".into());
        assert!(form.into_new_transaction().is_err());
    }
}
