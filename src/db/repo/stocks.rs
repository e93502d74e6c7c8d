//! Stock level operations.

use super::Repository;
use crate::domain::{Space, StockEntry, TimeMs, UserId};
use sqlx::Row;
use std::collections::HashMap;

fn row_to_stock(row: &sqlx::sqlite::SqliteRow) -> StockEntry {
    let user: String = row.get("user");
    let space: String = row.get("space");
    StockEntry {
        user: UserId::new(user),
        space: Space::parse(&space).unwrap_or(Space::Crafting),
        item_id: row.get("item_id"),
        label: row.get("label"),
        quantity: row.get("quantity"),
        updated_at: TimeMs::new(row.get("updated_at")),
    }
}

impl Repository {
    /// Insert or replace one stock row.
    pub async fn upsert_stock(&self, entry: &StockEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO stocks (user, space, item_id, label, quantity, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user, space, item_id)
            DO UPDATE SET label = excluded.label,
                          quantity = excluded.quantity,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(entry.user.as_str())
        .bind(entry.space.as_str())
        .bind(&entry.item_id)
        .bind(&entry.label)
        .bind(entry.quantity)
        .bind(entry.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Fetch one stock row.
    pub async fn get_stock(
        &self,
        user: &UserId,
        space: Space,
        item_id: &str,
    ) -> Result<Option<StockEntry>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT * FROM stocks WHERE user = ? AND space = ? AND item_id = ?",
        )
        .bind(user.as_str())
        .bind(space.as_str())
        .bind(item_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.as_ref().map(row_to_stock))
    }

    /// List a user's stocks within one space, ordered by label.
    pub async fn list_stocks(
        &self,
        user: &UserId,
        space: Space,
    ) -> Result<Vec<StockEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM stocks WHERE user = ? AND space = ? ORDER BY label ASC",
        )
        .bind(user.as_str())
        .bind(space.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(row_to_stock).collect())
    }

    /// Map of item id to quantity for one space, for feasibility checks.
    pub async fn stock_quantities(
        &self,
        user: &UserId,
        space: Space,
    ) -> Result<HashMap<String, i64>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT item_id, quantity FROM stocks WHERE user = ? AND space = ?",
        )
        .bind(user.as_str())
        .bind(space.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("item_id"), row.get::<i64, _>("quantity")))
            .collect())
    }

    /// Apply a manual delta to one stock, clamping at zero. Creates the row
    /// at the clamped delta if the item was never stocked. Returns the row
    /// after the adjustment.
    pub async fn adjust_stock(
        &self,
        user: &UserId,
        space: Space,
        item_id: &str,
        label: &str,
        delta: i64,
        now: TimeMs,
    ) -> Result<StockEntry, sqlx::Error> {
        let current = self.get_stock(user, space, item_id).await?;
        let entry = match current {
            Some(existing) => StockEntry {
                quantity: existing.adjusted(delta),
                label: label.to_string(),
                updated_at: now,
                ..existing
            },
            None => StockEntry {
                user: user.clone(),
                space,
                item_id: item_id.to_string(),
                label: label.to_string(),
                quantity: delta.max(0),
                updated_at: now,
            },
        };
        self.upsert_stock(&entry).await?;
        Ok(entry)
    }
}
