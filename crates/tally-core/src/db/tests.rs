//! Database tests

use chrono::NaiveDate;

use super::*;
use crate::error::Error;
use crate::models::*;
use crate::password::PasswordHash;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn test_hash() -> PasswordHash {
    PasswordHash::from_raw_password("secret123", 4).unwrap()
}

fn create_user(db: &Database, username: &str, email: &str) -> User {
    db.create_user(&NewUser::new(username, email).unwrap(), &test_hash())
        .unwrap()
}

fn add(db: &Database, user_id: i64, ty: TransactionType, amount: f64, category: &str, day: &str) -> Transaction {
    let tx = NewTransaction::new(ty, amount, category, None, date(day)).unwrap();
    db.create_transaction(user_id, &tx).unwrap()
}

#[test]
fn test_in_memory_db_seeds_categories() {
    let db = Database::in_memory().unwrap();
    let categories = db.list_categories().unwrap();
    assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
    assert!(db.list_users().unwrap().is_empty());
}

#[test]
fn test_seeding_is_idempotent() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.seed_default_categories().unwrap(), 0);

    // Reopening the same file must not duplicate the defaults
    let reopened = Database::new(db.path()).unwrap();
    assert_eq!(
        reopened.list_categories().unwrap().len(),
        DEFAULT_CATEGORIES.len()
    );
}

#[test]
fn test_create_and_lookup_user() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "Alice@Example.com");

    assert!(user.id > 0);
    assert_eq!(user.email, "alice@example.com");

    let by_id = db.get_user(user.id).unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_email = db.get_user_by_email("ALICE@example.com").unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let (found, hash) = db.get_user_credentials("alice@example.com").unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(hash.verify("secret123").unwrap());

    assert!(db.get_user(9999).unwrap().is_none());
    assert!(db.get_user_credentials("nobody@example.com").unwrap().is_none());
}

#[test]
fn test_duplicate_user_rejected() {
    let db = Database::in_memory().unwrap();
    create_user(&db, "alice", "alice@example.com");

    let same_email = NewUser::new("alice2", "alice@example.com").unwrap();
    match db.create_user(&same_email, &test_hash()) {
        Err(Error::Conflict(msg)) => assert_eq!(msg, "User already exists with this email"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let same_username = NewUser::new("alice", "other@example.com").unwrap();
    match db.create_user(&same_username, &test_hash()) {
        Err(Error::Conflict(msg)) => assert_eq!(msg, "Username is already taken"),
        other => panic!("expected conflict, got {:?}", other),
    }

    assert_eq!(db.list_users().unwrap().len(), 1);
}

#[test]
fn test_insert_race_reports_conflict() {
    let db = Database::in_memory().unwrap();
    create_user(&db, "alice", "alice@example.com");
    let conn = db.conn().unwrap();

    // Rows that slipped past the duplicate checks still fail as conflicts
    let same_email = NewUser::new("alice2", "alice@example.com").unwrap();
    match users::insert_user(&conn, &same_email, &test_hash()) {
        Err(Error::Conflict(msg)) => assert_eq!(msg, "User already exists with this email"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let same_name = NewUser::new("alice", "other@example.com").unwrap();
    match users::insert_user(&conn, &same_name, &test_hash()) {
        Err(Error::Conflict(msg)) => assert_eq!(msg, "Username is already taken"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let fresh = NewUser::new("bob", "bob@example.com").unwrap();
    assert!(users::insert_user(&conn, &fresh, &test_hash()).unwrap() > 0);
}

#[test]
fn test_unique_violation_passes_other_errors_through() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let err = conn
        .execute("INSERT INTO categories (name, type) VALUES ('X', 'transfer')", [])
        .unwrap_err();
    assert!(matches!(
        unique_violation(err, |_| "dup".to_string()),
        Error::Database(_)
    ));
}

#[test]
fn test_categories_by_type_sorted() {
    let db = Database::in_memory().unwrap();

    let income = db.list_categories_by_type(TransactionType::Income).unwrap();
    let names: Vec<&str> = income.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Freelance", "Investment", "Other Income", "Salary"]);

    let expense = db.list_categories_by_type(TransactionType::Expense).unwrap();
    assert_eq!(expense.len(), 7);
    assert!(expense
        .iter()
        .all(|c| c.category_type == TransactionType::Expense));

    // Full list: expense before income (alphabetical by type)
    let all = db.list_categories().unwrap();
    assert_eq!(all[0].category_type, TransactionType::Expense);
    assert_eq!(all.last().unwrap().category_type, TransactionType::Income);
}

#[test]
fn test_create_category_and_conflict() {
    let db = Database::in_memory().unwrap();

    let pets = NewCategory::new("Pets", TransactionType::Expense, Some("#123456")).unwrap();
    let created = db.create_category(&pets).unwrap();
    assert_eq!(created.name, "Pets");
    assert_eq!(created.color, "#123456");

    assert!(matches!(db.create_category(&pets), Err(Error::Conflict(_))));

    // Same name under the other type is allowed
    let pets_income = NewCategory::new("Pets", TransactionType::Income, None).unwrap();
    let created = db.create_category(&pets_income).unwrap();
    assert_eq!(created.color, DEFAULT_CATEGORY_COLOR);
}

#[test]
fn test_transaction_crud() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "alice@example.com");

    let new_tx = NewTransaction::new(
        TransactionType::Expense,
        23.10,
        "Food",
        Some("Lunch"),
        date("2024-03-01"),
    )
    .unwrap()
    .with_receipt_path("uploads/receipt-1.png");

    let tx = db.create_transaction(user.id, &new_tx).unwrap();
    assert_eq!(tx.user_id, user.id);
    assert_eq!(tx.amount, 23.10);
    assert_eq!(tx.description, "Lunch");
    assert_eq!(tx.date, date("2024-03-01"));
    assert_eq!(tx.receipt_path.as_deref(), Some("uploads/receipt-1.png"));

    let fetched = db.get_transaction(user.id, tx.id).unwrap().unwrap();
    assert_eq!(fetched, tx);

    assert!(db.delete_transaction(user.id, tx.id).unwrap());
    assert!(!db.delete_transaction(user.id, tx.id).unwrap());
    assert!(db.get_transaction(user.id, tx.id).unwrap().is_none());
}

#[test]
fn test_transactions_are_scoped_to_user() {
    let db = Database::in_memory().unwrap();
    let alice = create_user(&db, "alice", "alice@example.com");
    let bob = create_user(&db, "bobby", "bob@example.com");

    let tx = add(&db, alice.id, TransactionType::Expense, 5.0, "Food", "2024-01-01");

    assert!(db.list_transactions(bob.id, None).unwrap().is_empty());
    assert!(db.get_transaction(bob.id, tx.id).unwrap().is_none());
    assert!(!db.delete_transaction(bob.id, tx.id).unwrap());
    assert_eq!(db.list_transactions(alice.id, None).unwrap().len(), 1);
}

#[test]
fn test_list_transactions_order_and_range() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "alice@example.com");

    let jan = add(&db, user.id, TransactionType::Expense, 10.0, "Food", "2024-01-15");
    let feb_a = add(&db, user.id, TransactionType::Income, 1000.0, "Salary", "2024-02-01");
    let feb_b = add(&db, user.id, TransactionType::Expense, 20.0, "Shopping", "2024-02-01");
    let mar = add(&db, user.id, TransactionType::Expense, 30.0, "Utilities", "2024-03-31");

    let ids: Vec<i64> = db
        .list_transactions(user.id, None)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![mar.id, feb_b.id, feb_a.id, jan.id]);

    // Inclusive on both ends
    let range = DateRange {
        from: date("2024-02-01"),
        to: date("2024-03-31"),
    };
    let ids: Vec<i64> = db
        .list_transactions(user.id, Some(range))
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![mar.id, feb_b.id, feb_a.id]);
}

#[test]
fn test_amount_floor_enforced_by_schema() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "alice@example.com");
    let conn = db.conn().unwrap();

    let result = conn.execute(
        "INSERT INTO transactions (user_id, type, amount, category, date) VALUES (?, 'expense', 0.0, 'Food', '2024-01-01')",
        rusqlite::params![user.id],
    );
    assert!(result.is_err());
}

#[test]
fn test_stats() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "alice@example.com");
    let other = create_user(&db, "bobby", "bob@example.com");

    add(&db, user.id, TransactionType::Expense, 10.0, "Food", "2024-01-05");
    add(&db, user.id, TransactionType::Expense, 15.0, "Food", "2024-02-10");
    add(&db, user.id, TransactionType::Expense, 40.0, "Transportation", "2024-02-11");
    add(&db, user.id, TransactionType::Income, 500.0, "Salary", "2024-02-01");
    add(&db, other.id, TransactionType::Expense, 999.0, "Food", "2024-02-01");

    let stats = db.transaction_stats(user.id).unwrap();

    let summary: Vec<(TransactionType, &str, f64, i64)> = stats
        .stats
        .iter()
        .map(|s| (s.transaction_type, s.category.as_str(), s.total, s.count))
        .collect();
    assert_eq!(
        summary,
        vec![
            (TransactionType::Income, "Salary", 500.0, 1),
            (TransactionType::Expense, "Transportation", 40.0, 1),
            (TransactionType::Expense, "Food", 25.0, 2),
        ]
    );

    let monthly: Vec<(&str, TransactionType, f64)> = stats
        .monthly_stats
        .iter()
        .map(|m| (m.month.as_str(), m.transaction_type, m.total))
        .collect();
    assert_eq!(
        monthly,
        vec![
            ("2024-01", TransactionType::Expense, 10.0),
            ("2024-02", TransactionType::Expense, 55.0),
            ("2024-02", TransactionType::Income, 500.0),
        ]
    );
}

#[test]
fn test_stats_empty_for_new_user() {
    let db = Database::in_memory().unwrap();
    let user = create_user(&db, "alice", "alice@example.com");
    let stats = db.transaction_stats(user.id).unwrap();
    assert!(stats.stats.is_empty());
    assert!(stats.monthly_stats.is_empty());
}
