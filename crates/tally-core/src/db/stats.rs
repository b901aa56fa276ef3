//! Dashboard aggregates

use rusqlite::params;

use super::{parse_type, Database};
use crate::error::Result;
use crate::models::{CategoryStat, MonthlyStat, TransactionStats};

impl Database {
    /// Totals per (type, category), largest first
    pub fn category_stats(&self, user_id: i64) -> Result<Vec<CategoryStat>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT type, category, SUM(amount) AS total, COUNT(*) AS count
            FROM transactions
            WHERE user_id = ?
            GROUP BY type, category
            ORDER BY total DESC, type, category
            "#,
        )?;

        let stats = stmt
            .query_map(params![user_id], |row| {
                let type_str: String = row.get(0)?;
                Ok(CategoryStat {
                    transaction_type: parse_type(&type_str),
                    category: row.get(1)?,
                    total: row.get(2)?,
                    count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(stats)
    }

    /// Totals per (month, type), oldest month first
    pub fn monthly_stats(&self, user_id: i64) -> Result<Vec<MonthlyStat>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT strftime('%Y-%m', date) AS month, type, SUM(amount) AS total
            FROM transactions
            WHERE user_id = ?
            GROUP BY month, type
            ORDER BY month ASC, type
            "#,
        )?;

        let stats = stmt
            .query_map(params![user_id], |row| {
                let type_str: String = row.get(1)?;
                Ok(MonthlyStat {
                    month: row.get(0)?,
                    transaction_type: parse_type(&type_str),
                    total: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(stats)
    }

    pub fn transaction_stats(&self, user_id: i64) -> Result<TransactionStats> {
        Ok(TransactionStats {
            stats: self.category_stats(user_id)?,
            monthly_stats: self.monthly_stats(user_id)?,
        })
    }
}
