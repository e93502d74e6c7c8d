use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_user, AppState};
use crate::domain::{ProductionRun, RecipeId, TimeMs};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDto {
    pub id: String,
    pub recipe_id: String,
    pub input_quantity_used: i64,
    pub started_at: i64,
    pub duration_hours: i64,
    pub ends_at: i64,
    pub reduced_by_action: bool,
    pub status: String,
    /// Derived from the clock, never stored.
    pub phase: String,
    pub time_remaining_ms: i64,
    pub progress: f64,
}

impl RunDto {
    fn from_run(run: &ProductionRun, now: TimeMs) -> Self {
        RunDto {
            id: run.id.clone(),
            recipe_id: run.recipe_id.as_str().to_string(),
            input_quantity_used: run.input_quantity_used,
            started_at: run.started_at.as_i64(),
            duration_hours: run.duration_hours,
            ends_at: run.ends_at.as_i64(),
            reduced_by_action: run.reduced_by_action,
            status: run.status.as_str().to_string(),
            phase: run.phase(now).as_str().to_string(),
            time_remaining_ms: run.time_remaining_ms(now),
            progress: run.progress(now),
        }
    }
}

pub async fn get_runs(
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RunDto>>, AppError> {
    let user = parse_user(&params.user)?;
    let now = state.now();
    let runs = state.runs.list(&user).await?;
    Ok(Json(runs.iter().map(|r| RunDto::from_run(r, now)).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRunBody {
    pub user: String,
    pub recipe_id: String,
    pub input_quantity: i64,
}

pub async fn post_run(
    State(state): State<AppState>,
    Json(body): Json<StartRunBody>,
) -> Result<(StatusCode, Json<RunDto>), AppError> {
    let user = parse_user(&body.user)?;
    let now = state.now();
    let run = state
        .runs
        .start(&user, &RecipeId::new(body.recipe_id), body.input_quantity, now)
        .await?;
    Ok((StatusCode::CREATED, Json(RunDto::from_run(&run, now))))
}

pub async fn accelerate_run(
    Path(run_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<RunDto>, AppError> {
    let user = parse_user(&params.user)?;
    let run = state.runs.accelerate(&user, &run_id).await?;
    Ok(Json(RunDto::from_run(&run, state.now())))
}

pub async fn complete_run(
    Path(run_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<RunDto>, AppError> {
    let user = parse_user(&params.user)?;
    let now = state.now();
    let run = state.runs.complete(&user, &run_id, now).await?;
    Ok(Json(RunDto::from_run(&run, now)))
}

pub async fn delete_run(
    Path(run_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = parse_user(&params.user)?;
    state.runs.delete(&user, &run_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
