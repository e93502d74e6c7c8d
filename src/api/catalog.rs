use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_space, AppState};
use crate::domain::{Group, Material, Recipe};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SpaceQuery {
    pub space: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: String,
    pub space: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub batch_size: i64,
    pub duration_hours: i64,
    pub unit_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_cost: Option<String>,
    pub materials: Vec<RecipeMaterialDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMaterialDto {
    pub material_id: String,
    pub qty_per_craft: i64,
}

impl RecipeDto {
    pub(crate) fn from_recipe(recipe: &Recipe) -> Self {
        RecipeDto {
            id: recipe.id.as_str().to_string(),
            space: recipe.space.as_str().to_string(),
            name: recipe.name.clone(),
            category: recipe.category.clone(),
            batch_size: recipe.batch_size,
            duration_hours: recipe.duration_hours,
            unit_price: recipe.unit_price.to_string(),
            tool_cost: recipe.tool_cost.map(|c| c.to_string()),
            materials: recipe
                .materials
                .iter()
                .map(|(id, qty)| RecipeMaterialDto {
                    material_id: id.as_str().to_string(),
                    qty_per_craft: *qty,
                })
                .collect(),
        }
    }
}

pub async fn get_recipes(
    Query(params): Query<SpaceQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeDto>>, AppError> {
    let space = parse_space(&params.space)?;
    let recipes = state.repo.list_recipes(space).await?;
    Ok(Json(recipes.iter().map(RecipeDto::from_recipe).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDto {
    pub id: String,
    pub space: String,
    pub name: String,
    pub unit: String,
}

pub async fn get_materials(
    Query(params): Query<SpaceQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MaterialDto>>, AppError> {
    let space = parse_space(&params.space)?;
    let materials = state.repo.list_materials(space).await?;
    Ok(Json(
        materials
            .iter()
            .map(|m: &Material| MaterialDto {
                id: m.id.as_str().to_string(),
                space: m.space.as_str().to_string(),
                name: m.name.clone(),
                unit: m.unit.clone(),
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
}

pub async fn get_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupDto>>, AppError> {
    let groups = state.repo.list_groups().await?;
    Ok(Json(
        groups
            .iter()
            .map(|g: &Group| GroupDto {
                id: g.id.as_str().to_string(),
                name: g.name.clone(),
            })
            .collect(),
    ))
}
