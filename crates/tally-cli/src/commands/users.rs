//! User account commands

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{models::NewUser, Database, PasswordHash, ValidatedPassword};

use super::open_db;

pub fn cmd_users_list(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    list_users(&db)
}

pub(crate) fn list_users(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Create one with: tally users add");
        return Ok(());
    }

    println!("{:>4}  {:<20} {:<30} Created", "ID", "Username", "Email");
    for user in &users {
        println!(
            "{:>4}  {:<20} {:<30} {}",
            user.id,
            user.username,
            user.email,
            user.created_at.format("%Y-%m-%d")
        );
    }
    println!();
    println!("{} user(s)", users.len());

    Ok(())
}

pub fn cmd_users_add(db_path: &Path, username: &str, email: &str, password: &str) -> Result<()> {
    let db = open_db(db_path)?;
    add_user(&db, username, email, password, PasswordHash::DEFAULT_COST)
}

pub(crate) fn add_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
    cost: u32,
) -> Result<()> {
    let new_user = NewUser::new(username, email)?;
    let password = ValidatedPassword::new(password)?;
    let hash = PasswordHash::new(password, cost)?;

    let user = db
        .create_user(&new_user, &hash)
        .context("Failed to create user")?;

    println!("✅ Created user {} <{}> (id {})", user.username, user.email, user.id);
    Ok(())
}
