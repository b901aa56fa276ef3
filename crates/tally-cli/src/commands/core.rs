//! Core commands: database opening and init

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::Database;

/// Open the database, creating and migrating it if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path).with_context(|| format!("Failed to open database at {}", db_path.display()))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}", db_path.display());

    let db = open_db(db_path)?;
    let categories = db.list_categories()?;

    println!("✅ Database initialized");
    println!("   {} categories available", categories.len());
    println!();
    println!("Next steps:");
    println!("  tally users add -u <name> -e <email> -p <password>");
    println!("  tally serve --port 5000");

    Ok(())
}
