//! Run lifecycle service: start, accelerate, complete, delete.

use crate::db::Repository;
use crate::domain::{HistoryEntry, HistoryKind, ProductionRun, TimeMs, UserId};
use crate::engine;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct RunService {
    repo: Arc<Repository>,
    /// Hours the one-time acceleration removes from a run's end timestamp.
    reduction_hours: i64,
}

impl RunService {
    pub fn new(repo: Arc<Repository>, reduction_hours: i64) -> Self {
        Self {
            repo,
            reduction_hours,
        }
    }

    /// Start a timed run for a recipe.
    pub async fn start(
        &self,
        user: &UserId,
        recipe_id: &crate::domain::RecipeId,
        input_quantity_used: i64,
        now: TimeMs,
    ) -> Result<ProductionRun, AppError> {
        if input_quantity_used <= 0 {
            return Err(AppError::BadRequest(
                "input quantity must be positive".to_string(),
            ));
        }
        let recipe = self
            .repo
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipe {}", recipe_id)))?;

        let run = engine::start_run(user, &recipe, input_quantity_used, now);
        self.repo.insert_run(&run).await?;
        info!(user = user.as_str(), run_id = %run.id, recipe = recipe_id.as_str(), "Run started");
        Ok(run)
    }

    /// Apply the one-time acceleration. Already-accelerated runs are returned
    /// unchanged, so repeated requests cannot shorten a run twice.
    pub async fn accelerate(&self, user: &UserId, run_id: &str) -> Result<ProductionRun, AppError> {
        let mut run = self
            .repo
            .get_run(user, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("run {}", run_id)))?;

        if engine::accelerate(&mut run, self.reduction_hours) {
            self.repo
                .update_run_acceleration(user, run_id, run.ends_at)
                .await?;
            info!(user = user.as_str(), run_id = run_id, "Run accelerated");
        }
        Ok(run)
    }

    /// Mark a run DONE and append its transformation history entry. Completing
    /// an already-DONE run changes nothing and returns the stored run.
    pub async fn complete(
        &self,
        user: &UserId,
        run_id: &str,
        now: TimeMs,
    ) -> Result<ProductionRun, AppError> {
        let mut run = self
            .repo
            .get_run(user, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("run {}", run_id)))?;

        if let Some(record) = engine::complete(&mut run) {
            let entry = HistoryEntry {
                id: uuid::Uuid::new_v4().to_string(),
                user: user.clone(),
                created_at: now,
                kind: HistoryKind::Transformation {
                    recipe_id: record.recipe_id,
                    started_at: record.started_at,
                    ends_at: record.ends_at,
                    reduced_by_action: record.reduced_by_action,
                },
            };
            self.repo.complete_run_atomic(user, run_id, &entry).await?;
            info!(user = user.as_str(), run_id = run_id, "Run completed");
        }
        Ok(run)
    }

    pub async fn list(&self, user: &UserId) -> Result<Vec<ProductionRun>, AppError> {
        Ok(self.repo.list_runs(user).await?)
    }

    pub async fn delete(&self, user: &UserId, run_id: &str) -> Result<(), AppError> {
        if self.repo.delete_run(user, run_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("run {}", run_id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use crate::domain::{Recipe, RecipeId, RunStatus, Space};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    async fn setup() -> (RunService, Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        let repo = Arc::new(Repository::new(pool));
        let service = RunService::new(repo.clone(), 1);
        (service, repo, temp_dir)
    }

    async fn seed_recipe(repo: &Repository) -> RecipeId {
        let recipe = Recipe {
            id: RecipeId::new("meth"),
            space: Space::Potions,
            name: "Bleu".to_string(),
            category: None,
            batch_size: 1,
            duration_hours: 48,
            unit_price: Decimal::from(100),
            tool_cost: None,
            materials: BTreeMap::new(),
        };
        repo.insert_recipe(&recipe).await.unwrap();
        recipe.id
    }

    #[tokio::test]
    async fn test_start_requires_known_recipe() {
        let (service, _repo, _temp) = setup().await;
        let err = service
            .start(
                &UserId::new("u1"),
                &RecipeId::new("nope"),
                5,
                TimeMs::new(0),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_accelerate_persists_once() {
        let (service, repo, _temp) = setup().await;
        let user = UserId::new("u1");
        let recipe_id = seed_recipe(&repo).await;

        let run = service
            .start(&user, &recipe_id, 5, TimeMs::new(0))
            .await
            .unwrap();
        let once = service.accelerate(&user, &run.id).await.unwrap();
        assert_eq!(once.ends_at, run.ends_at.minus_hours(1));

        let twice = service.accelerate(&user, &run.id).await.unwrap();
        assert_eq!(twice.ends_at, once.ends_at);

        let stored = repo.get_run(&user, &run.id).await.unwrap().unwrap();
        assert!(stored.reduced_by_action);
        assert_eq!(stored.ends_at, once.ends_at);
    }

    #[tokio::test]
    async fn test_complete_writes_single_history_entry() {
        let (service, repo, _temp) = setup().await;
        let user = UserId::new("u1");
        let recipe_id = seed_recipe(&repo).await;

        let run = service
            .start(&user, &recipe_id, 5, TimeMs::new(0))
            .await
            .unwrap();
        let done = service
            .complete(&user, &run.id, TimeMs::new(1_000))
            .await
            .unwrap();
        assert_eq!(done.status, RunStatus::Done);

        // Second completion is a no-op and must not duplicate the ledger line.
        service
            .complete(&user, &run.id, TimeMs::new(2_000))
            .await
            .unwrap();
        let history = repo.list_history(&user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_transformation());
    }
}
