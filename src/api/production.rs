use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_user, AppState};
use crate::domain::{ProductionRecord, RecipeId};
use crate::error::AppError;
use crate::orchestration::PlanPreview;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBody {
    pub user: String,
    pub recipe_id: String,
    pub desired_qty: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecordDto {
    pub id: String,
    pub recipe_id: String,
    pub recipe_name: String,
    pub crafts_count: i64,
    pub desired_qty: i64,
    pub actual_production: i64,
    pub materials_consumed: Vec<ConsumedMaterialDto>,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedMaterialDto {
    pub material_id: String,
    pub quantity: i64,
}

impl ProductionRecordDto {
    fn from_record(record: &ProductionRecord) -> Self {
        ProductionRecordDto {
            id: record.id.clone(),
            recipe_id: record.recipe_id.as_str().to_string(),
            recipe_name: record.recipe_name.clone(),
            crafts_count: record.crafts_count,
            desired_qty: record.desired_qty,
            actual_production: record.actual_production,
            materials_consumed: record
                .materials_consumed
                .iter()
                .map(|(id, qty)| ConsumedMaterialDto {
                    material_id: id.as_str().to_string(),
                    quantity: *qty,
                })
                .collect(),
            created_at: record.created_at.as_i64(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuery {
    pub user: String,
    pub recipe_id: String,
    pub desired_qty: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlanDto {
    pub recipe_id: String,
    pub desired_qty: i64,
    pub batch_size: i64,
    pub crafts_needed: i64,
    pub actual_production: i64,
    pub surplus: i64,
    pub total_price: String,
    pub total_tool_cost: Option<String>,
    pub producible: bool,
    pub materials: Vec<PlannedMaterialDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMaterialDto {
    pub material_id: String,
    pub qty_per_craft: i64,
    pub total_needed: i64,
    pub available: i64,
    pub missing: i64,
}

impl BatchPlanDto {
    fn from_preview(recipe_id: &str, preview: &PlanPreview) -> Self {
        BatchPlanDto {
            recipe_id: recipe_id.to_string(),
            desired_qty: preview.plan.desired_qty,
            batch_size: preview.plan.batch_size,
            crafts_needed: preview.plan.crafts_needed,
            actual_production: preview.plan.actual_production,
            surplus: preview.plan.surplus,
            total_price: preview.plan.total_price.to_string(),
            total_tool_cost: preview.plan.total_tool_cost.map(|c| c.to_string()),
            producible: preview.report.producible,
            materials: preview
                .plan
                .materials
                .iter()
                .map(|need| {
                    let available = preview
                        .available
                        .get(&need.material_id)
                        .copied()
                        .unwrap_or(0);
                    PlannedMaterialDto {
                        material_id: need.material_id.as_str().to_string(),
                        qty_per_craft: need.qty_per_craft,
                        total_needed: need.total_needed,
                        available,
                        missing: (need.total_needed - available).max(0),
                    }
                })
                .collect(),
        }
    }
}

/// What-if calculator: the batch plan plus per-material coverage against the
/// caller's current stock, without writing anything.
pub async fn plan_production(
    Query(params): Query<PlanQuery>,
    State(state): State<AppState>,
) -> Result<Json<BatchPlanDto>, AppError> {
    let user = parse_user(&params.user)?;
    let preview = state
        .production
        .plan(&user, &RecipeId::new(params.recipe_id.clone()), params.desired_qty)
        .await?;
    Ok(Json(BatchPlanDto::from_preview(&params.recipe_id, &preview)))
}

/// The atomic production path: feasibility check, then stock decrements plus
/// one production record in a single transaction.
pub async fn validate_production(
    State(state): State<AppState>,
    Json(body): Json<ValidateBody>,
) -> Result<(StatusCode, Json<ProductionRecordDto>), AppError> {
    let user = parse_user(&body.user)?;
    let record = state
        .production
        .validate_production(
            &user,
            &RecipeId::new(body.recipe_id),
            body.desired_qty,
            state.now(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductionRecordDto::from_record(&record)),
    ))
}

pub async fn get_production_records(
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductionRecordDto>>, AppError> {
    let user = parse_user(&params.user)?;
    let records = state.repo.list_production_records(&user).await?;
    Ok(Json(
        records.iter().map(ProductionRecordDto::from_record).collect(),
    ))
}
