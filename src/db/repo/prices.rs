//! Price observation operations.

use super::Repository;
use crate::domain::{CrateId, PriceObservation, TimeMs, UserId};
use rust_decimal::Decimal;
use sqlx::Row;

fn row_to_observation(row: &sqlx::sqlite::SqliteRow) -> PriceObservation {
    let user: String = row.get("user");
    let crate_id: String = row.get("crate_id");
    let values: String = row.get("price_values");
    PriceObservation {
        user: UserId::new(user),
        crate_id: CrateId::new(crate_id),
        values: super::parse_json::<Vec<Decimal>>("prices.price_values", &values),
        updated_at: TimeMs::new(row.get("updated_at")),
    }
}

impl Repository {
    /// Fetch one crate's price observations.
    pub async fn get_prices(
        &self,
        user: &UserId,
        crate_id: &CrateId,
    ) -> Result<Option<PriceObservation>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM prices WHERE user = ? AND crate_id = ?")
            .bind(user.as_str())
            .bind(crate_id.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.as_ref().map(row_to_observation))
    }

    /// List every crate's price observations for one user.
    pub async fn list_prices(&self, user: &UserId) -> Result<Vec<PriceObservation>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM prices WHERE user = ? ORDER BY crate_id ASC")
            .bind(user.as_str())
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().map(row_to_observation).collect())
    }

    /// Append one observed sale price to a crate, creating the row on first
    /// observation. Returns the observation after the append.
    pub async fn append_price(
        &self,
        user: &UserId,
        crate_id: &CrateId,
        value: Decimal,
        now: TimeMs,
    ) -> Result<PriceObservation, sqlx::Error> {
        let mut values = self
            .get_prices(user, crate_id)
            .await?
            .map(|o| o.values)
            .unwrap_or_default();
        values.push(value);
        let observation = PriceObservation {
            user: user.clone(),
            crate_id: crate_id.clone(),
            values,
            updated_at: now,
        };
        self.store_prices(&observation).await?;
        Ok(observation)
    }

    /// Remove the observation at `index`. Deleting the last value removes the
    /// whole row, so an empty list never lingers. `Ok(None)` means the crate
    /// had no row or the index was out of range.
    pub async fn delete_price_at(
        &self,
        user: &UserId,
        crate_id: &CrateId,
        index: usize,
        now: TimeMs,
    ) -> Result<Option<PriceObservation>, sqlx::Error> {
        let Some(mut observation) = self.get_prices(user, crate_id).await? else {
            return Ok(None);
        };
        if index >= observation.values.len() {
            return Ok(None);
        }
        observation.values.remove(index);
        observation.updated_at = now;

        if observation.values.is_empty() {
            sqlx::query("DELETE FROM prices WHERE user = ? AND crate_id = ?")
                .bind(user.as_str())
                .bind(crate_id.as_str())
                .execute(self.pool())
                .await?;
        } else {
            self.store_prices(&observation).await?;
        }
        Ok(Some(observation))
    }

    async fn store_prices(&self, observation: &PriceObservation) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO prices (user, crate_id, price_values, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user, crate_id)
            DO UPDATE SET price_values = excluded.price_values,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(observation.user.as_str())
        .bind(observation.crate_id.as_str())
        .bind(
            serde_json::to_string(&observation.values).unwrap_or_else(|_| "[]".to_string()),
        )
        .bind(observation.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
