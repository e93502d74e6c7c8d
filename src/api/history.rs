use axum::extract::{Query, State};
use axum::Json;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::{parse_user, AppState};
use crate::domain::{HistoryEntry, HistoryKind, TimeMs};
use crate::engine::{group_by_day, windowed_revenue};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user: String,
    /// Minutes east of UTC for calendar-day grouping; defaults to UTC.
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub days: Vec<DayGroupDto>,
    pub total_count: usize,
    pub transformation_count: usize,
    pub sale_count: usize,
    pub windowed_revenue: WindowedRevenueDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroupDto {
    pub date: String,
    pub entries: Vec<HistoryEntryDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowedRevenueDto {
    pub window_days: i64,
    pub revenue: String,
    pub crates_sold: i64,
    pub sale_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum HistoryKindDto {
    #[serde(rename_all = "camelCase")]
    Transformation {
        recipe_id: String,
        started_at: i64,
        ends_at: i64,
        reduced_by_action: bool,
    },
    #[serde(rename_all = "camelCase")]
    Sale {
        crate_id: String,
        crate_label: String,
        quantity_sold: i64,
        estimated_value: String,
        actual_value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub id: String,
    pub created_at: i64,
    #[serde(flatten)]
    pub kind: HistoryKindDto,
}

impl HistoryEntryDto {
    pub(crate) fn from_entry(entry: &HistoryEntry) -> Self {
        let kind = match &entry.kind {
            HistoryKind::Transformation {
                recipe_id,
                started_at,
                ends_at,
                reduced_by_action,
            } => HistoryKindDto::Transformation {
                recipe_id: recipe_id.as_str().to_string(),
                started_at: started_at.as_i64(),
                ends_at: ends_at.as_i64(),
                reduced_by_action: *reduced_by_action,
            },
            HistoryKind::Sale {
                crate_id,
                crate_label,
                quantity_sold,
                estimated_value,
                actual_value,
                notes,
            } => HistoryKindDto::Sale {
                crate_id: crate_id.as_str().to_string(),
                crate_label: crate_label.clone(),
                quantity_sold: *quantity_sold,
                estimated_value: estimated_value.to_string(),
                actual_value: actual_value.to_string(),
                notes: notes.clone(),
            },
        };
        HistoryEntryDto {
            id: entry.id.clone(),
            created_at: entry.created_at.as_i64(),
            kind,
        }
    }
}

pub async fn get_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user = parse_user(&params.user)?;
    let offset_minutes = params.utc_offset_minutes.unwrap_or(0);
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| AppError::BadRequest("invalid utc offset".into()))?;

    let entries = state.repo.list_history(&user).await?;
    let transformation_count = entries.iter().filter(|e| e.is_transformation()).count();
    let sale_count = entries.iter().filter(|e| e.is_sale()).count();

    let window_days = state.config.revenue_window_days;
    let window_start = TimeMs::new(state.now().as_i64() - window_days * 24 * 60 * 60 * 1000);
    let summary = windowed_revenue(&entries, window_start);

    let days = group_by_day(&entries, offset)
        .into_iter()
        .map(|(date, bucket)| DayGroupDto {
            date: date.to_string(),
            entries: bucket.iter().map(HistoryEntryDto::from_entry).collect(),
        })
        .collect();

    Ok(Json(HistoryResponse {
        days,
        total_count: entries.len(),
        transformation_count,
        sale_count,
        windowed_revenue: WindowedRevenueDto {
            window_days,
            revenue: summary.revenue.to_string(),
            crates_sold: summary.crates_sold,
            sale_count: summary.sale_count,
        },
    }))
}
