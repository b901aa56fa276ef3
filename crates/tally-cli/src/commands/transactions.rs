//! Transaction commands (list, stats, categories)

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{
    models::{parse_date, DateRange, TransactionType, User},
    Database,
};

use super::open_db;

fn find_user(db: &Database, email: &str) -> Result<User> {
    db.get_user_by_email(email)?
        .with_context(|| format!("No user with email {}", email))
}

/// Both ends or neither; a lone bound is an error rather than silently ignored
pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(DateRange {
            from: parse_date(from)?,
            to: parse_date(to)?,
        })),
        (None, None) => Ok(None),
        _ => bail!("--from and --to must be given together"),
    }
}

pub fn cmd_transactions(
    db_path: &Path,
    email: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let db = open_db(db_path)?;
    list_transactions(&db, email, parse_range(from, to)?)
}

pub(crate) fn list_transactions(db: &Database, email: &str, range: Option<DateRange>) -> Result<()> {
    let user = find_user(db, email)?;
    let transactions = db.list_transactions(user.id, range)?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:<7}  {:>10}  {:<15}  Description",
        "ID", "Date", "Type", "Amount", "Category"
    );
    let mut income = 0.0;
    let mut expenses = 0.0;
    for tx in &transactions {
        match tx.transaction_type {
            TransactionType::Income => income += tx.amount,
            TransactionType::Expense => expenses += tx.amount,
        }
        let receipt = if tx.receipt_path.is_some() { " 🧾" } else { "" };
        println!(
            "{:>5}  {}  {:<7}  {:>10.2}  {:<15}  {}{}",
            tx.id, tx.date, tx.transaction_type, tx.amount, tx.category, tx.description, receipt
        );
    }

    println!();
    println!("Income:   {:>10.2}", income);
    println!("Expenses: {:>10.2}", expenses);
    println!("Balance:  {:>10.2}", income - expenses);

    Ok(())
}

pub fn cmd_stats(db_path: &Path, email: &str) -> Result<()> {
    let db = open_db(db_path)?;
    show_stats(&db, email)
}

pub(crate) fn show_stats(db: &Database, email: &str) -> Result<()> {
    let user = find_user(db, email)?;
    let stats = db.transaction_stats(user.id)?;

    if stats.stats.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("📊 By category");
    for stat in &stats.stats {
        println!(
            "   {:<7}  {:<15}  {:>10.2}  ({} transaction(s))",
            stat.transaction_type, stat.category, stat.total, stat.count
        );
    }

    println!();
    println!("📅 By month");
    for month in &stats.monthly_stats {
        println!(
            "   {}  {:<7}  {:>10.2}",
            month.month, month.transaction_type, month.total
        );
    }

    Ok(())
}

pub fn cmd_categories(db_path: &Path, category_type: Option<&str>) -> Result<()> {
    let db = open_db(db_path)?;
    list_categories(&db, category_type)
}

pub(crate) fn list_categories(db: &Database, category_type: Option<&str>) -> Result<()> {
    let categories = match category_type {
        Some(t) => {
            let t: TransactionType = t
                .parse()
                .map_err(|_| anyhow::anyhow!("Category type must be income or expense"))?;
            db.list_categories_by_type(t)?
        }
        None => db.list_categories()?,
    };

    for category in &categories {
        println!(
            "{:<7}  {:<15}  {}",
            category.category_type, category.name, category.color
        );
    }

    Ok(())
}
