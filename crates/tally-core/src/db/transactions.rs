//! Transaction operations
//!
//! Every query is scoped to a user; one user can never see or delete
//! another user's transactions.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, parse_type, Database};
use crate::error::{Error, Result};
use crate::models::{DateRange, NewTransaction, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, category, description, date, receipt_path, created_at";

impl Database {
    /// Record a transaction for `user_id` and return it as stored
    pub fn create_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, type, amount, category, description, date, receipt_path)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.transaction_type.as_str(),
                tx.amount,
                tx.category,
                tx.description,
                tx.date.to_string(),
                tx.receipt_path,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Get one of the user's transactions
    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// List the user's transactions, newest first
    ///
    /// With a range, only dates within `from..=to` are returned.
    pub fn list_transactions(
        &self,
        user_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let transactions = match range {
            Some(DateRange { from, to }) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions
                     WHERE user_id = ? AND date BETWEEN ? AND ?
                     ORDER BY date DESC, id DESC",
                    TRANSACTION_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(
                        params![user_id, from.to_string(), to.to_string()],
                        Self::row_to_transaction,
                    )?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC",
                    TRANSACTION_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![user_id], Self::row_to_transaction)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(transactions)
    }

    /// Delete one of the user's transactions. Returns false if it did not exist.
    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Column order: id, user_id, type, amount, category, description, date,
    ///               receipt_path, created_at
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let type_str: String = row.get(2)?;
        let date_str: String = row.get(6)?;
        let created_at_str: String = row.get(8)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            transaction_type: parse_type(&type_str),
            amount: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            receipt_path: row.get(7)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
