//! Laundering ledger operations.

use super::Repository;
use crate::domain::{LaunderEntry, TimeMs, UserId};
use sqlx::Row;

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> LaunderEntry {
    let user: String = row.get("user");
    let dirty: String = row.get("dirty_amount");
    let clean: String = row.get("clean_amount");
    LaunderEntry {
        id: row.get("id"),
        user: UserId::new(user),
        dirty_amount: super::parse_decimal("laundry_entries.dirty_amount", &dirty),
        percentage: row.get::<i64, _>("percentage") as u32,
        clean_amount: super::parse_decimal("laundry_entries.clean_amount", &clean),
        for_boss: row.get::<i64, _>("for_boss") != 0,
        created_at: TimeMs::new(row.get("created_at")),
    }
}

impl Repository {
    /// Append one laundering entry.
    pub async fn insert_launder_entry(&self, entry: &LaunderEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO laundry_entries
            (id, user, dirty_amount, percentage, clean_amount, for_boss, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.user.as_str())
        .bind(entry.dirty_amount.to_string())
        .bind(entry.percentage as i64)
        .bind(entry.clean_amount.to_string())
        .bind(entry.for_boss as i64)
        .bind(entry.created_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// List a user's laundering entries, most recent first.
    pub async fn list_launder_entries(
        &self,
        user: &UserId,
    ) -> Result<Vec<LaunderEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM laundry_entries WHERE user = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(row_to_entry).collect())
    }

    /// Delete one laundering entry. Returns whether a row was removed.
    pub async fn delete_launder_entry(
        &self,
        user: &UserId,
        entry_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM laundry_entries WHERE user = ? AND id = ?")
            .bind(user.as_str())
            .bind(entry_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
