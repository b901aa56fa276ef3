//! User account operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, unique_violation, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};
use crate::password::PasswordHash;

const USER_COLUMNS: &str = "id, username, email, created_at";

/// Insert the row, reporting a duplicate email or username as `Error::Conflict`
pub(super) fn insert_user(
    conn: &rusqlite::Connection,
    user: &NewUser,
    password_hash: &PasswordHash,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
        params![user.username, user.email, password_hash.as_str()],
    )
    .map_err(|e| {
        unique_violation(e, |detail| {
            if detail.contains("users.email") {
                "User already exists with this email".to_string()
            } else {
                "Username is already taken".to_string()
            }
        })
    })?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Register a user. Email and username must both be unused.
    pub fn create_user(&self, user: &NewUser, password_hash: &PasswordHash) -> Result<User> {
        let conn = self.conn()?;

        let email_taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![user.email],
                |row| row.get(0),
            )
            .optional()?;
        if email_taken.is_some() {
            return Err(Error::Conflict("User already exists with this email".into()));
        }

        let username_taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?",
                params![user.username],
                |row| row.get(0),
            )
            .optional()?;
        if username_taken.is_some() {
            return Err(Error::Conflict("Username is already taken".into()));
        }

        // A concurrent registration can still win between the checks and here
        let id = insert_user(&conn, user, password_hash)?;
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive, emails are stored lower-cased)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.get_user_credentials(email)?.map(|(user, _)| user))
    }

    /// Look up a user and their stored password hash for login
    pub fn get_user_credentials(&self, email: &str) -> Result<Option<(User, PasswordHash)>> {
        let conn = self.conn()?;
        let email = email.trim().to_lowercase();
        let found = conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE email = ?",
                    USER_COLUMNS
                ),
                params![email],
                |row| {
                    let user = Self::row_to_user(row)?;
                    let hash: String = row.get(4)?;
                    Ok((user, PasswordHash::new_unchecked(&hash)))
                },
            )
            .optional()?;
        Ok(found)
    }

    /// List all users, oldest first
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Column order: id, username, email, created_at
    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
