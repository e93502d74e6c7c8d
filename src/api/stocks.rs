use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_space, parse_user, AppState};
use crate::domain::StockEntry;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct StocksQuery {
    pub user: String,
    pub space: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDto {
    pub item_id: String,
    pub label: String,
    pub quantity: i64,
    pub updated_at: i64,
}

impl StockDto {
    fn from_entry(entry: &StockEntry) -> Self {
        StockDto {
            item_id: entry.item_id.clone(),
            label: entry.label.clone(),
            quantity: entry.quantity,
            updated_at: entry.updated_at.as_i64(),
        }
    }
}

pub async fn get_stocks(
    Query(params): Query<StocksQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<StockDto>>, AppError> {
    let user = parse_user(&params.user)?;
    let space = parse_space(&params.space)?;
    let stocks = state.repo.list_stocks(&user, space).await?;
    Ok(Json(stocks.iter().map(StockDto::from_entry).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutStockBody {
    pub user: String,
    pub space: String,
    pub label: String,
    pub quantity: i64,
}

/// Direct set of a stock level, clamped at zero.
pub async fn put_stock(
    Path(item_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<PutStockBody>,
) -> Result<Json<StockDto>, AppError> {
    let user = parse_user(&body.user)?;
    let space = parse_space(&body.space)?;
    let entry = StockEntry {
        user,
        space,
        item_id,
        label: body.label,
        quantity: body.quantity.max(0),
        updated_at: state.now(),
    };
    state.repo.upsert_stock(&entry).await?;
    Ok(Json(StockDto::from_entry(&entry)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockBody {
    pub user: String,
    pub space: String,
    pub label: String,
    pub delta: i64,
}

/// Manual ±delta on a stock level, clamped at zero.
pub async fn adjust_stock(
    Path(item_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<AdjustStockBody>,
) -> Result<Json<StockDto>, AppError> {
    let user = parse_user(&body.user)?;
    let space = parse_space(&body.space)?;
    let entry = state
        .repo
        .adjust_stock(&user, space, &item_id, &body.label, body.delta, state.now())
        .await?;
    Ok(Json(StockDto::from_entry(&entry)))
}
