pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod laundry;
pub mod orders;
pub mod prices;
pub mod production;
pub mod runs;
pub mod sales;
pub mod stocks;

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{Space, TimeMs, UserId};
use crate::error::AppError;
use crate::orchestration::{ProductionService, RunService, SaleService};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub runs: RunService,
    pub production: ProductionService,
    pub sales: SaleService,
    clock: watch::Receiver<TimeMs>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config, clock: watch::Receiver<TimeMs>) -> Self {
        Self {
            runs: RunService::new(repo.clone(), config.time_reduction_hours),
            production: ProductionService::new(repo.clone()),
            sales: SaleService::new(repo.clone()),
            repo,
            config,
            clock,
        }
    }

    /// Latest published tick. The channel is seeded with a real timestamp at
    /// construction, so whatever it holds is the time, epoch zero included.
    pub fn now(&self) -> TimeMs {
        *self.clock.borrow()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/catalog/recipes", get(catalog::get_recipes))
        .route("/v1/catalog/materials", get(catalog::get_materials))
        .route("/v1/catalog/groups", get(catalog::get_groups))
        .route("/v1/stocks", get(stocks::get_stocks))
        .route("/v1/stocks/:item_id", put(stocks::put_stock))
        .route("/v1/stocks/:item_id/adjust", post(stocks::adjust_stock))
        .route("/v1/prices", get(prices::get_prices))
        .route("/v1/prices/:crate_id", post(prices::post_price))
        .route(
            "/v1/prices/:crate_id/:index",
            delete(prices::delete_price),
        )
        .route("/v1/runs", get(runs::get_runs).post(runs::post_run))
        .route("/v1/runs/:id/accelerate", post(runs::accelerate_run))
        .route("/v1/runs/:id/complete", post(runs::complete_run))
        .route("/v1/runs/:id", delete(runs::delete_run))
        .route("/v1/production/plan", get(production::plan_production))
        .route(
            "/v1/production/validate",
            post(production::validate_production),
        )
        .route(
            "/v1/production/records",
            get(production::get_production_records),
        )
        .route("/v1/history", get(history::get_history))
        .route("/v1/sales", post(sales::post_sale))
        .route(
            "/v1/orders",
            get(orders::get_orders).post(orders::post_order),
        )
        .route("/v1/orders/:id/complete", post(orders::complete_order))
        .route("/v1/orders/:id", delete(orders::delete_order))
        .route(
            "/v1/laundry",
            get(laundry::get_laundry).post(laundry::post_laundry),
        )
        .route("/v1/laundry/:id", delete(laundry::delete_laundry))
        .route("/v1/dashboard", get(dashboard::get_dashboard))
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_user(user: &str) -> Result<UserId, AppError> {
    let trimmed = user.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("user must not be empty".into()));
    }
    Ok(UserId::new(trimmed.to_string()))
}

pub(crate) fn parse_space(space: &str) -> Result<Space, AppError> {
    Space::parse(space)
        .ok_or_else(|| AppError::BadRequest(format!("unknown space: {space}")))
}
