//! History ledger operations.

use super::Repository;
use crate::domain::{HistoryEntry, HistoryKind, ProductionRecord, RecipeId, TimeMs, UserId};
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::warn;

pub(super) fn entry_type(kind: &HistoryKind) -> &'static str {
    match kind {
        HistoryKind::Transformation { .. } => "TRANSFORMATION",
        HistoryKind::Sale { .. } => "SALE",
    }
}

pub(super) fn payload_json(kind: &HistoryKind) -> String {
    serde_json::to_string(kind).unwrap_or_else(|_| "{}".to_string())
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Option<HistoryEntry> {
    let id: String = row.get("id");
    let user: String = row.get("user");
    let payload: String = row.get("payload");
    let created_at: i64 = row.get("created_at");

    match serde_json::from_str::<HistoryKind>(&payload) {
        Ok(kind) => Some(HistoryEntry {
            id,
            user: UserId::new(user),
            created_at: TimeMs::new(created_at),
            kind,
        }),
        Err(e) => {
            warn!(entry_id = %id, error = %e, "Skipping history entry with unreadable payload");
            None
        }
    }
}

impl Repository {
    /// Append one history entry.
    pub async fn insert_history_entry(&self, entry: &HistoryEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO history (id, user, entry_type, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.user.as_str())
        .bind(entry_type(&entry.kind))
        .bind(payload_json(&entry.kind))
        .bind(entry.created_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// List a user's history entries, most recent first. Entries whose stored
    /// payload no longer deserializes are skipped with a warning.
    pub async fn list_history(&self, user: &UserId) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM history WHERE user = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().filter_map(row_to_entry).collect())
    }

    /// List a user's production records, most recent first.
    pub async fn list_production_records(
        &self,
        user: &UserId,
    ) -> Result<Vec<ProductionRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM production_records WHERE user = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let recipe_id: String = row.get("recipe_id");
                let materials_consumed: String = row.get("materials_consumed");
                ProductionRecord {
                    id: row.get("id"),
                    user: user.clone(),
                    recipe_id: RecipeId::new(recipe_id),
                    recipe_name: row.get("recipe_name"),
                    crafts_count: row.get("crafts_count"),
                    desired_qty: row.get("desired_qty"),
                    actual_production: row.get("actual_production"),
                    materials_consumed: super::parse_json::<BTreeMap<_, _>>(
                        "production_records.materials_consumed",
                        &materials_consumed,
                    ),
                    created_at: TimeMs::new(row.get("created_at")),
                }
            })
            .collect())
    }
}
