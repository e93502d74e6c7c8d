//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `stocks.rs` - stock level operations
//! - `prices.rs` - price observation operations
//! - `runs.rs` - production run operations
//! - `history.rs` - history ledger operations
//! - `orders.rs` - order operations
//! - `laundry.rs` - laundering ledger operations
//!
//! Catalog reads/seeds and the transactions that span multiple domains
//! (production validation, run completion, sale recording) live here.

mod history;
mod laundry;
mod orders;
mod prices;
mod runs;
mod stocks;

use crate::domain::{Group, GroupId, HistoryEntry, Material, MaterialId, ProductionRecord,
    Recipe, RecipeId, RunStatus, Space, TimeMs, UserId};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

/// Parse a stored canonical decimal, logging and defaulting to zero on damage.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or_else(|e| {
        warn!(field = field, value = %raw, error = %e, "Failed to parse stored decimal, using default");
        Decimal::default()
    })
}

/// Parse a stored JSON column, logging and defaulting on damage.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned + Default>(field: &str, raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(field = field, error = %e, "Failed to parse stored JSON, using default");
        T::default()
    })
}

fn row_to_recipe(row: &sqlx::sqlite::SqliteRow) -> Recipe {
    let id: String = row.get("id");
    let space: String = row.get("space");
    let unit_price: String = row.get("unit_price");
    let tool_cost: Option<String> = row.get("tool_cost");
    let materials: String = row.get("materials");

    Recipe {
        id: RecipeId::new(id),
        space: Space::parse(&space).unwrap_or(Space::Crafting),
        name: row.get("name"),
        category: row.get("category"),
        batch_size: row.get("batch_size"),
        duration_hours: row.get("duration_hours"),
        unit_price: parse_decimal("recipes.unit_price", &unit_price),
        tool_cost: tool_cost.map(|c| parse_decimal("recipes.tool_cost", &c)),
        materials: parse_json::<BTreeMap<MaterialId, i64>>("recipes.materials", &materials),
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Catalog operations (seeded reference data, shared across users)
    // =========================================================================

    /// Insert or replace a catalog recipe. Seed-time only.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO recipes
            (id, space, name, category, batch_size, duration_hours, unit_price, tool_cost, materials)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipe.id.as_str())
        .bind(recipe.space.as_str())
        .bind(&recipe.name)
        .bind(recipe.category.as_deref())
        .bind(recipe.batch_size)
        .bind(recipe.duration_hours)
        .bind(recipe.unit_price.to_string())
        .bind(recipe.tool_cost.map(|c| c.to_string()))
        .bind(serde_json::to_string(&recipe.materials).unwrap_or_else(|_| "{}".to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List the recipes of one space, ordered by display name.
    pub async fn list_recipes(&self, space: Space) -> Result<Vec<Recipe>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM recipes WHERE space = ? ORDER BY name ASC")
            .bind(space.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_recipe).collect())
    }

    /// Fetch one recipe by id.
    pub async fn get_recipe(&self, id: &RecipeId) -> Result<Option<Recipe>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM recipes WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_recipe))
    }

    pub async fn insert_material(&self, material: &Material) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO materials (id, space, name, unit) VALUES (?, ?, ?, ?)",
        )
        .bind(material.id.as_str())
        .bind(material.space.as_str())
        .bind(&material.name)
        .bind(&material.unit)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_materials(&self, space: Space) -> Result<Vec<Material>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM materials WHERE space = ? ORDER BY name ASC")
            .bind(space.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let space: String = row.get("space");
                Material {
                    id: MaterialId::new(id),
                    space: Space::parse(&space).unwrap_or(Space::Crafting),
                    name: row.get("name"),
                    unit: row.get("unit"),
                }
            })
            .collect())
    }

    pub async fn get_material(
        &self,
        id: &MaterialId,
    ) -> Result<Option<Material>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM materials WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| {
            let id: String = row.get("id");
            let space: String = row.get("space");
            Material {
                id: MaterialId::new(id),
                space: Space::parse(&space).unwrap_or(Space::Crafting),
                name: row.get("name"),
                unit: row.get("unit"),
            }
        }))
    }

    pub async fn insert_group(&self, group: &Group) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR REPLACE INTO groups (id, name) VALUES (?, ?)")
            .bind(group.id.as_str())
            .bind(&group.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM groups ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                Group {
                    id: GroupId::new(id),
                    name: row.get("name"),
                }
            })
            .collect())
    }

    pub async fn get_group(&self, id: &GroupId) -> Result<Option<Group>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM groups WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| {
            let id: String = row.get("id");
            Group {
                id: GroupId::new(id),
                name: row.get("name"),
            }
        }))
    }

    // =========================================================================
    // Transaction coordination (spans multiple domains)
    // =========================================================================

    /// Persist a production validation atomically: decrement every consumed
    /// material stock and append one production record. If any statement
    /// fails, nothing is applied.
    ///
    /// Feasibility must have been checked by the caller; this method assumes
    /// the decrements cannot drive any stock negative.
    pub async fn validate_production_atomic(
        &self,
        user: &UserId,
        space: Space,
        decrements: &[(MaterialId, i64)],
        record: &ProductionRecord,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for (material_id, consumed) in decrements {
            sqlx::query(
                r#"
                UPDATE stocks SET quantity = quantity - ?, updated_at = ?
                WHERE user = ? AND space = ? AND item_id = ?
                "#,
            )
            .bind(consumed)
            .bind(record.created_at.as_i64())
            .bind(user.as_str())
            .bind(space.as_str())
            .bind(material_id.as_str())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO production_records
            (id, user, recipe_id, recipe_name, crafts_count, desired_qty,
             actual_production, materials_consumed, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(user.as_str())
        .bind(record.recipe_id.as_str())
        .bind(&record.recipe_name)
        .bind(record.crafts_count)
        .bind(record.desired_qty)
        .bind(record.actual_production)
        .bind(
            serde_json::to_string(&record.materials_consumed)
                .unwrap_or_else(|_| "{}".to_string()),
        )
        .bind(record.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Mark a run DONE and append its transformation history entry in one
    /// transaction, so a completed run can never lack its ledger line.
    pub async fn complete_run_atomic(
        &self,
        user: &UserId,
        run_id: &str,
        entry: &HistoryEntry,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE runs SET status = ? WHERE user = ? AND id = ?")
            .bind(RunStatus::Done.as_str())
            .bind(user.as_str())
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO history (id, user, entry_type, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(user.as_str())
        .bind(history::entry_type(&entry.kind))
        .bind(history::payload_json(&entry.kind))
        .bind(entry.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Record a crate sale atomically: append the sale history entry and set
    /// the crate stock to its decremented quantity.
    pub async fn record_sale_atomic(
        &self,
        user: &UserId,
        space: Space,
        crate_item_id: &str,
        new_quantity: i64,
        entry: &HistoryEntry,
        now: TimeMs,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE stocks SET quantity = ?, updated_at = ?
            WHERE user = ? AND space = ? AND item_id = ?
            "#,
        )
        .bind(new_quantity)
        .bind(now.as_i64())
        .bind(user.as_str())
        .bind(space.as_str())
        .bind(crate_item_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO history (id, user, entry_type, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(user.as_str())
        .bind(history::entry_type(&entry.kind))
        .bind(history::payload_json(&entry.kind))
        .bind(entry.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    pub(crate) async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_recipe_roundtrip() {
        let (repo, _temp) = setup_test_db().await;

        let recipe = Recipe {
            id: RecipeId::new("tec9"),
            space: Space::Crafting,
            name: "Tec-9".to_string(),
            category: Some("armes".to_string()),
            batch_size: 5,
            duration_hours: 24,
            unit_price: Decimal::from(350),
            tool_cost: None,
            materials: BTreeMap::from([
                (MaterialId::new("acier"), 5),
                (MaterialId::new("ressort"), 2),
            ]),
        };
        repo.insert_recipe(&recipe).await.unwrap();

        let fetched = repo.get_recipe(&recipe.id).await.unwrap();
        assert_eq!(fetched, Some(recipe.clone()));

        let listed = repo.list_recipes(Space::Crafting).await.unwrap();
        assert_eq!(listed, vec![recipe]);
        assert!(repo.list_recipes(Space::Potions).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_materials_and_groups_roundtrip() {
        let (repo, _temp) = setup_test_db().await;

        let material = Material {
            id: MaterialId::new("acier"),
            space: Space::Crafting,
            name: "Acier".to_string(),
            unit: "unités".to_string(),
        };
        repo.insert_material(&material).await.unwrap();
        assert_eq!(
            repo.list_materials(Space::Crafting).await.unwrap(),
            vec![material.clone()]
        );
        assert_eq!(
            repo.get_material(&material.id).await.unwrap(),
            Some(material)
        );

        let group = Group {
            id: GroupId::new("g1"),
            name: "Les Affranchis".to_string(),
        };
        repo.insert_group(&group).await.unwrap();
        assert_eq!(repo.list_groups().await.unwrap(), vec![group.clone()]);
        assert_eq!(repo.get_group(&group.id).await.unwrap(), Some(group));
    }
}
