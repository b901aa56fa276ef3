//! Bank statement text parsing
//!
//! A line-oriented scan over statement or transaction-history text (usually
//! PDF output). Any line carrying both a date and a number becomes a candidate
//! expense in the "Other" category for the user to review.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::TransactionType;
use crate::receipt::{trim_line, AMOUNT_PATTERN, FALLBACK_CATEGORY};

/// `M/D/YYYY` or `YYYY-MM-DD`, ASCII digits only
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2}/[0-9]{1,2}/[0-9]{4}|[0-9]{4}-[0-9]{2}-[0-9]{2})")
        .expect("valid regex")
});

/// A candidate transaction found in statement text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Date exactly as written in the statement
    pub date: String,
    pub amount: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
}

/// Scan statement text line by line.
///
/// The amount is the first number on the line, which is often part of the
/// date itself; the description is the text before that number.
pub fn parse_transaction_history(text: &str) -> Vec<StatementLine> {
    text.split('\n')
        .map(trim_line)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<StatementLine> {
    let date = DATE_PATTERN.captures(line)?.get(1)?.as_str();
    let amount_match = AMOUNT_PATTERN.captures(line)?;
    let amount: f64 = amount_match[1].parse().ok()?;

    let full = amount_match.get(0)?.as_str();
    let description = line.split(full).next().unwrap_or_default().trim();

    Some(StatementLine {
        date: date.to_string(),
        amount,
        description: description.to_string(),
        transaction_type: TransactionType::Expense,
        category: FALLBACK_CATEGORY.to_string(),
    })
}
