use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::history::HistoryEntryDto;
use super::{parse_space, parse_user, AppState};
use crate::domain::CrateId;
use crate::error::AppError;
use crate::orchestration::sales::SaleRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSaleBody {
    pub user: String,
    pub space: String,
    pub crate_id: String,
    pub quantity: i64,
    pub actual_value: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn post_sale(
    State(state): State<AppState>,
    Json(body): Json<PostSaleBody>,
) -> Result<(StatusCode, Json<HistoryEntryDto>), AppError> {
    let user = parse_user(&body.user)?;
    let space = parse_space(&body.space)?;
    let entry = state
        .sales
        .record_sale(
            &user,
            space,
            SaleRequest {
                crate_id: CrateId::new(body.crate_id),
                quantity: body.quantity,
                actual_value: body.actual_value,
                notes: body.notes,
            },
            state.now(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(HistoryEntryDto::from_entry(&entry)),
    ))
}
