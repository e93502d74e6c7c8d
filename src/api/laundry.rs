use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{parse_user, AppState};
use crate::domain::LaunderEntry;
use crate::engine::{launder_clean_amount, launder_totals};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryResponse {
    pub entries: Vec<LaunderEntryDto>,
    pub totals: LaunderTotalsDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunderEntryDto {
    pub id: String,
    pub dirty_amount: String,
    pub percentage: u32,
    pub clean_amount: String,
    pub for_boss: bool,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunderTotalsDto {
    pub total_dirty: String,
    pub total_clean: String,
    pub owed_to_house: String,
    pub net_balance: String,
    pub house_cut_percent: u32,
}

impl LaunderEntryDto {
    fn from_entry(entry: &LaunderEntry) -> Self {
        LaunderEntryDto {
            id: entry.id.clone(),
            dirty_amount: entry.dirty_amount.to_string(),
            percentage: entry.percentage,
            clean_amount: entry.clean_amount.to_string(),
            for_boss: entry.for_boss,
            created_at: entry.created_at.as_i64(),
        }
    }
}

pub async fn get_laundry(
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<LaundryResponse>, AppError> {
    let user = parse_user(&params.user)?;
    let entries = state.repo.list_launder_entries(&user).await?;
    let totals = launder_totals(&entries, state.config.house_cut_percent);
    Ok(Json(LaundryResponse {
        entries: entries.iter().map(LaunderEntryDto::from_entry).collect(),
        totals: LaunderTotalsDto {
            total_dirty: totals.total_dirty.to_string(),
            total_clean: totals.total_clean.normalize().to_string(),
            owed_to_house: totals.owed_to_house.normalize().to_string(),
            net_balance: totals.net_balance.normalize().to_string(),
            house_cut_percent: state.config.house_cut_percent,
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLaundryBody {
    pub user: String,
    pub dirty_amount: Decimal,
    pub percentage: u32,
    #[serde(default)]
    pub for_boss: bool,
}

pub async fn post_laundry(
    State(state): State<AppState>,
    Json(body): Json<PostLaundryBody>,
) -> Result<(StatusCode, Json<LaunderEntryDto>), AppError> {
    let user = parse_user(&body.user)?;
    if body.dirty_amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("dirty amount must be positive".into()));
    }
    if !state.config.launder_percent_options.contains(&body.percentage) {
        return Err(AppError::BadRequest(format!(
            "percentage {} is not one of the allowed rates",
            body.percentage
        )));
    }

    let entry = LaunderEntry {
        id: uuid::Uuid::new_v4().to_string(),
        user,
        dirty_amount: body.dirty_amount,
        percentage: body.percentage,
        clean_amount: launder_clean_amount(body.dirty_amount, body.percentage),
        for_boss: body.for_boss,
        created_at: state.now(),
    };
    state.repo.insert_launder_entry(&entry).await?;
    Ok((
        StatusCode::CREATED,
        Json(LaunderEntryDto::from_entry(&entry)),
    ))
}

pub async fn delete_laundry(
    Path(entry_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = parse_user(&params.user)?;
    if state.repo.delete_launder_entry(&user, &entry_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("laundry entry {}", entry_id)))
    }
}
