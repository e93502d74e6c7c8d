//! Production validation: feasibility check then atomic stock consumption.

use crate::db::Repository;
use crate::domain::{MaterialId, ProductionRecord, Space, TimeMs, UserId};
use crate::engine::{check_feasibility, BatchPlan, FeasibilityReport};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// What-if preview of a production: the plan, whether current stock covers
/// it, and the on-hand quantity per material. Nothing is written.
pub struct PlanPreview {
    pub plan: BatchPlan,
    pub report: FeasibilityReport,
    pub available: HashMap<MaterialId, i64>,
}

#[derive(Clone)]
pub struct ProductionService {
    repo: Arc<Repository>,
}

impl ProductionService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Plan the crafts for a desired quantity without touching any stock.
    /// A non-positive quantity yields an all-zero plan, like the calculator.
    pub async fn plan(
        &self,
        user: &UserId,
        recipe_id: &crate::domain::RecipeId,
        desired_qty: i64,
    ) -> Result<PlanPreview, AppError> {
        let recipe = self
            .repo
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipe {}", recipe_id)))?;
        let plan = BatchPlan::for_recipe(&recipe, desired_qty);
        let available: HashMap<MaterialId, i64> = self
            .repo
            .stock_quantities(user, recipe.space)
            .await?
            .into_iter()
            .map(|(item_id, qty)| (MaterialId::new(item_id), qty))
            .collect();
        let report = check_feasibility(&plan, &available);
        Ok(PlanPreview {
            plan,
            report,
            available,
        })
    }

    /// Validate a production: check every material need against current stock
    /// and, only if all are covered, decrement the stocks and append the
    /// production record in one transaction. A shortfall leaves every stock
    /// untouched.
    pub async fn validate_production(
        &self,
        user: &UserId,
        recipe_id: &crate::domain::RecipeId,
        desired_qty: i64,
        now: TimeMs,
    ) -> Result<ProductionRecord, AppError> {
        if desired_qty <= 0 {
            return Err(AppError::BadRequest(
                "desired quantity must be positive".to_string(),
            ));
        }
        let recipe = self
            .repo
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipe {}", recipe_id)))?;

        let plan = BatchPlan::for_recipe(&recipe, desired_qty);
        let available: HashMap<MaterialId, i64> = self
            .repo
            .stock_quantities(user, recipe.space)
            .await?
            .into_iter()
            .map(|(item_id, qty)| (MaterialId::new(item_id), qty))
            .collect();

        let report = check_feasibility(&plan, &available);
        if !report.producible {
            let detail = report
                .shortfalls
                .iter()
                .map(|s| format!("{}: need {}, have {}", s.material_id, s.needed, s.available))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::InsufficientStock(detail));
        }

        let decrements: Vec<(MaterialId, i64)> = plan
            .materials
            .iter()
            .map(|need| (need.material_id.clone(), need.total_needed))
            .collect();
        let record = ProductionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.clone(),
            recipe_id: recipe.id.clone(),
            recipe_name: recipe.name.clone(),
            crafts_count: plan.crafts_needed,
            desired_qty: plan.desired_qty,
            actual_production: plan.actual_production,
            materials_consumed: decrements.iter().cloned().collect(),
            created_at: now,
        };
        self.repo
            .validate_production_atomic(user, recipe.space, &decrements, &record)
            .await?;
        info!(
            user = user.as_str(),
            recipe = recipe_id.as_str(),
            crafts = plan.crafts_needed,
            "Production validated"
        );
        Ok(record)
    }
}
