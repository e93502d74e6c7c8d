//! Production run operations.

use super::Repository;
use crate::domain::{ProductionRun, RecipeId, RunStatus, TimeMs, UserId};
use sqlx::Row;

fn row_to_run(row: &sqlx::sqlite::SqliteRow) -> ProductionRun {
    let user: String = row.get("user");
    let recipe_id: String = row.get("recipe_id");
    let status: String = row.get("status");
    ProductionRun {
        id: row.get("id"),
        user: UserId::new(user),
        recipe_id: RecipeId::new(recipe_id),
        input_quantity_used: row.get("input_quantity_used"),
        started_at: TimeMs::new(row.get("started_at")),
        duration_hours: row.get("duration_hours"),
        ends_at: TimeMs::new(row.get("ends_at")),
        reduced_by_action: row.get::<i64, _>("reduced_by_action") != 0,
        status: RunStatus::parse(&status).unwrap_or(RunStatus::Running),
        created_at: TimeMs::new(row.get("created_at")),
    }
}

impl Repository {
    /// Insert a new run.
    pub async fn insert_run(&self, run: &ProductionRun) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO runs
            (id, user, recipe_id, input_quantity_used, started_at, duration_hours,
             ends_at, reduced_by_action, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(run.user.as_str())
        .bind(run.recipe_id.as_str())
        .bind(run.input_quantity_used)
        .bind(run.started_at.as_i64())
        .bind(run.duration_hours)
        .bind(run.ends_at.as_i64())
        .bind(run.reduced_by_action as i64)
        .bind(run.status.as_str())
        .bind(run.created_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Fetch one run scoped to its owner.
    pub async fn get_run(
        &self,
        user: &UserId,
        run_id: &str,
    ) -> Result<Option<ProductionRun>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM runs WHERE user = ? AND id = ?")
            .bind(user.as_str())
            .bind(run_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.as_ref().map(row_to_run))
    }

    /// List a user's runs, most recently started first.
    pub async fn list_runs(&self, user: &UserId) -> Result<Vec<ProductionRun>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM runs WHERE user = ? ORDER BY started_at DESC, id DESC",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(row_to_run).collect())
    }

    /// Persist an acceleration: new end time plus the reduced flag.
    pub async fn update_run_acceleration(
        &self,
        user: &UserId,
        run_id: &str,
        ends_at: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE runs SET ends_at = ?, reduced_by_action = 1 WHERE user = ? AND id = ?",
        )
        .bind(ends_at.as_i64())
        .bind(user.as_str())
        .bind(run_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Delete one run. Returns whether a row was removed.
    pub async fn delete_run(&self, user: &UserId, run_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM runs WHERE user = ? AND id = ?")
            .bind(user.as_str())
            .bind(run_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_db;
    use crate::domain::{ProductionRun, RecipeId, RunStatus, TimeMs, UserId};

    fn run(id: &str, user: &UserId, started_at: i64) -> ProductionRun {
        ProductionRun {
            id: id.to_string(),
            user: user.clone(),
            recipe_id: RecipeId::new("r1"),
            input_quantity_used: 10,
            started_at: TimeMs::new(started_at),
            duration_hours: 48,
            ends_at: TimeMs::new(started_at + 48 * 3_600_000),
            reduced_by_action: false,
            status: RunStatus::Running,
            created_at: TimeMs::new(started_at),
        }
    }

    #[tokio::test]
    async fn test_run_roundtrip_and_ordering() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1");

        repo.insert_run(&run("run-a", &user, 1_000)).await.unwrap();
        repo.insert_run(&run("run-b", &user, 5_000)).await.unwrap();

        let listed = repo.list_runs(&user).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "run-b");
        assert_eq!(listed[1], run("run-a", &user, 1_000));
    }

    #[tokio::test]
    async fn test_acceleration_persisted() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1");
        let original = run("run-a", &user, 0);
        repo.insert_run(&original).await.unwrap();

        let reduced_ends = original.ends_at.minus_hours(1);
        repo.update_run_acceleration(&user, "run-a", reduced_ends)
            .await
            .unwrap();

        let stored = repo.get_run(&user, "run-a").await.unwrap().unwrap();
        assert_eq!(stored.ends_at, reduced_ends);
        assert!(stored.reduced_by_action);
    }

    #[tokio::test]
    async fn test_delete_scoped_to_owner() {
        let (repo, _temp) = setup_test_db().await;
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        repo.insert_run(&run("run-a", &alice, 0)).await.unwrap();

        assert!(!repo.delete_run(&bob, "run-a").await.unwrap());
        assert!(repo.delete_run(&alice, "run-a").await.unwrap());
        assert!(repo.get_run(&alice, "run-a").await.unwrap().is_none());
    }
}
