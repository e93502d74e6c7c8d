use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{parse_user, AppState};
use crate::domain::{CrateId, PriceObservation};
use crate::engine::average_price;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListDto {
    pub crate_id: String,
    pub values: Vec<String>,
    pub average: String,
    pub updated_at: i64,
}

impl PriceListDto {
    fn from_observation(observation: &PriceObservation) -> Self {
        PriceListDto {
            crate_id: observation.crate_id.as_str().to_string(),
            values: observation.values.iter().map(|v| v.to_string()).collect(),
            average: average_price(&observation.values).to_string(),
            updated_at: observation.updated_at.as_i64(),
        }
    }
}

pub async fn get_prices(
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceListDto>>, AppError> {
    let user = parse_user(&params.user)?;
    let observations = state.repo.list_prices(&user).await?;
    Ok(Json(
        observations
            .iter()
            .map(PriceListDto::from_observation)
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PostPriceBody {
    pub user: String,
    pub value: Decimal,
}

pub async fn post_price(
    Path(crate_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<PostPriceBody>,
) -> Result<Json<PriceListDto>, AppError> {
    let user = parse_user(&body.user)?;
    if body.value <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".into()));
    }
    let observation = state
        .repo
        .append_price(&user, &CrateId::new(crate_id), body.value, state.now())
        .await?;
    Ok(Json(PriceListDto::from_observation(&observation)))
}

pub async fn delete_price(
    Path((crate_id, index)): Path<(String, usize)>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<PriceListDto>, AppError> {
    let user = parse_user(&params.user)?;
    let crate_id = CrateId::new(crate_id);
    let observation = state
        .repo
        .delete_price_at(&user, &crate_id, index, state.now())
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("price {} for crate {}", index, crate_id))
        })?;
    Ok(Json(PriceListDto::from_observation(&observation)))
}
