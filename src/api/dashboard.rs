use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_space, parse_user, AppState};
use crate::domain::{OrderStatus, RunPhase, TimeMs};
use crate::engine::{completed_order_total, launder_totals, total_stock_value, windowed_revenue};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub user: String,
    pub space: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_stock_value: String,
    pub window_days: i64,
    pub windowed_revenue: String,
    pub crates_sold: i64,
    pub running_runs: usize,
    pub ready_runs: usize,
    pub pending_orders: usize,
    pub pending_order_total: String,
    pub completed_order_total: String,
    pub launder_net_balance: String,
}

pub async fn get_dashboard(
    Query(params): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = parse_user(&params.user)?;
    let space = parse_space(&params.space)?;
    let now = state.now();

    let stocks = state.repo.list_stocks(&user, space).await?;
    let prices = state.repo.list_prices(&user).await?;

    let entries = state.repo.list_history(&user).await?;
    let window_days = state.config.revenue_window_days;
    let window_start = TimeMs::new(now.as_i64() - window_days * 24 * 60 * 60 * 1000);
    let revenue = windowed_revenue(&entries, window_start);

    let runs = state.repo.list_runs(&user).await?;
    let running_runs = runs.iter().filter(|r| r.phase(now) == RunPhase::Running).count();
    let ready_runs = runs.iter().filter(|r| r.phase(now) == RunPhase::Ready).count();

    let orders = state.repo.list_orders(&user, None).await?;
    let pending: Vec<_> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .collect();
    let pending_order_total = pending
        .iter()
        .map(|o| o.total_amount)
        .sum::<rust_decimal::Decimal>();

    let laundry = state.repo.list_launder_entries(&user).await?;
    let launder = launder_totals(&laundry, state.config.house_cut_percent);

    Ok(Json(DashboardResponse {
        total_stock_value: total_stock_value(&stocks, &prices).to_string(),
        window_days,
        windowed_revenue: revenue.revenue.to_string(),
        crates_sold: revenue.crates_sold,
        running_runs,
        ready_runs,
        pending_orders: pending.len(),
        pending_order_total: pending_order_total.to_string(),
        completed_order_total: completed_order_total(&orders).to_string(),
        launder_net_balance: launder.net_balance.normalize().to_string(),
    }))
}
