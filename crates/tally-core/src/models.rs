//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A registered user
///
/// The password hash lives only in the database and is never part of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A new user before insertion (already validated)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    /// Validate and normalize registration fields
    ///
    /// Usernames are trimmed and must be 3 to 30 characters. Emails are trimmed,
    /// lower-cased and must look like `local@domain`.
    pub fn new(username: &str, email: &str) -> Result<Self> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        let len = username.chars().count();
        if !(3..=30).contains(&len) {
            return Err(Error::InvalidData(
                "Username must be between 3 and 30 characters".into(),
            ));
        }

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(Error::InvalidData(
                    "Please enter a valid email address".into(),
                ))
            }
        }

        Ok(Self {
            username: username.to_string(),
            email,
        })
    }
}

/// Whether money came in or went out
///
/// Also used as the type of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Smallest amount a transaction may record
pub const MIN_TRANSACTION_AMOUNT: f64 = 0.01;

/// A recorded income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive; the direction comes from `transaction_type`
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    /// Where the uploaded receipt was stored, if any
    pub receipt_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction before insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub receipt_path: Option<String>,
}

impl NewTransaction {
    /// Build a transaction, trimming text fields and enforcing the amount floor
    pub fn new(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        description: Option<&str>,
        date: NaiveDate,
    ) -> Result<Self> {
        if !amount.is_finite() || amount < MIN_TRANSACTION_AMOUNT {
            return Err(Error::InvalidData(format!(
                "Amount must be at least {}",
                MIN_TRANSACTION_AMOUNT
            )));
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Category is required".into()));
        }

        Ok(Self {
            transaction_type,
            amount,
            category: category.to_string(),
            description: description.map(str::trim).unwrap_or_default().to_string(),
            date,
            receipt_path: None,
        })
    }

    pub fn with_receipt_path(mut self, path: impl Into<String>) -> Self {
        self.receipt_path = Some(path.into());
        self
    }
}

/// Parse a transaction date
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (the date part is kept),
/// which is what browser date pickers and `Date.toISOString()` produce.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::InvalidData(format!("Invalid date: {}", s)))
}

/// Default color for new categories
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A new category before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub category_type: TransactionType,
    pub color: String,
}

impl NewCategory {
    pub fn new(name: &str, category_type: TransactionType, color: Option<&str>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name is required".into()));
        }

        let color = color
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_COLOR);

        Ok(Self {
            name: name.to_string(),
            category_type,
            color: color.to_string(),
        })
    }
}

/// Categories created when the table is empty
pub const DEFAULT_CATEGORIES: &[(&str, TransactionType, &str)] = &[
    ("Salary", TransactionType::Income, "#28a745"),
    ("Freelance", TransactionType::Income, "#20c997"),
    ("Investment", TransactionType::Income, "#17a2b8"),
    ("Other Income", TransactionType::Income, "#6f42c1"),
    ("Food", TransactionType::Expense, "#dc3545"),
    ("Transportation", TransactionType::Expense, "#fd7e14"),
    ("Entertainment", TransactionType::Expense, "#6f42c1"),
    ("Utilities", TransactionType::Expense, "#6c757d"),
    ("Healthcare", TransactionType::Expense, "#e83e8c"),
    ("Shopping", TransactionType::Expense, "#ffc107"),
    ("Other", TransactionType::Expense, "#343a40"),
];

/// Inclusive date range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Total spent or earned per (type, category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub total: f64,
    pub count: i64,
}

/// Total per calendar month and type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStat {
    /// `YYYY-MM`
    pub month: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub total: f64,
}

/// Aggregates shown on the dashboard and analytics pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub stats: Vec<CategoryStat>,
    pub monthly_stats: Vec<MonthlyStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_fields() {
        let user = NewUser::new("  alice ", " Alice@Example.COM ").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_new_user_rejects_bad_input() {
        assert!(matches!(
            NewUser::new("al", "al@example.com"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            NewUser::new("alice", "not-an-email"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            NewUser::new("alice", "@example.com"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!(
            "income".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert_eq!(
            "EXPENSE".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_new_transaction_validation() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let tx = NewTransaction::new(
            TransactionType::Expense,
            12.5,
            "  Food ",
            Some("  lunch "),
            date,
        )
        .unwrap();
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.description, "lunch");
        assert!(tx.receipt_path.is_none());

        let tx = NewTransaction::new(TransactionType::Expense, 1.0, "Food", None, date).unwrap();
        assert_eq!(tx.description, "");

        assert!(NewTransaction::new(TransactionType::Expense, 0.0, "Food", None, date).is_err());
        assert!(
            NewTransaction::new(TransactionType::Expense, f64::NAN, "Food", None, date).is_err()
        );
        assert!(NewTransaction::new(TransactionType::Income, 5.0, "   ", None, date).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let want = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), want);
        assert_eq!(parse_date("2024-01-15T00:00:00.000Z").unwrap(), want);
        assert!(parse_date("15/01/2024").is_err());
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = Transaction {
            id: 1,
            user_id: 2,
            transaction_type: TransactionType::Income,
            amount: 100.0,
            category: "Salary".into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            receipt_path: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["date"], "2024-01-01");
    }

    #[test]
    fn test_new_category_defaults_color() {
        let cat = NewCategory::new(" Pets ", TransactionType::Expense, None).unwrap();
        assert_eq!(cat.name, "Pets");
        assert_eq!(cat.color, DEFAULT_CATEGORY_COLOR);
        assert!(NewCategory::new("", TransactionType::Expense, None).is_err());
    }
}
