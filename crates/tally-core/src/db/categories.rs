//! Category operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, parse_type, unique_violation, Database};
use crate::error::{Error, Result};
use crate::models::{Category, NewCategory, TransactionType, DEFAULT_CATEGORIES};

const CATEGORY_COLUMNS: &str = "id, name, type, color, created_at";

impl Database {
    /// Insert the default categories if the table is empty.
    ///
    /// Returns how many were inserted (0 when categories already exist).
    pub fn seed_default_categories(&self) -> Result<usize> {
        let mut conn = self.conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO categories (name, type, color) VALUES (?, ?, ?)")?;
            for (name, category_type, color) in DEFAULT_CATEGORIES {
                stmt.execute(params![name, category_type.as_str(), color])?;
            }
        }
        tx.commit()?;

        Ok(DEFAULT_CATEGORIES.len())
    }

    /// All categories, ordered by type then name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY type, name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Categories of one type, ordered by name
    pub fn list_categories_by_type(&self, category_type: TransactionType) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE type = ? ORDER BY name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![category_type.as_str()], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Create a category; `(name, type)` must be unique.
    pub fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ? AND type = ?",
                params![category.name, category.category_type.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let duplicate = || {
            format!(
                "Category '{}' already exists for {}",
                category.name, category.category_type
            )
        };
        if existing.is_some() {
            return Err(Error::Conflict(duplicate()));
        }

        conn.execute(
            "INSERT INTO categories (name, type, color) VALUES (?, ?, ?)",
            params![
                category.name,
                category.category_type.as_str(),
                category.color
            ],
        )
        .map_err(|e| unique_violation(e, |_| duplicate()))?;
        let id = conn.last_insert_rowid();

        let created = conn.query_row(
            &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
            params![id],
            Self::row_to_category,
        )?;
        Ok(created)
    }

    /// Column order: id, name, type, color, created_at
    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let type_str: String = row.get(2)?;
        let created_at_str: String = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            category_type: parse_type(&type_str),
            color: row.get(3)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
