//! Run timer state machine: create, accelerate once, complete once.
//!
//! Transitions mutate the in-memory run; persisting the result is the
//! caller's job. Double-accelerate and double-complete are safe no-ops so
//! duplicate user actions cannot corrupt state.

use crate::domain::{ProductionRun, Recipe, RecipeId, RunStatus, TimeMs, UserId};

/// Data for the single TRANSFORMATION history entry a completion emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    pub recipe_id: RecipeId,
    pub started_at: TimeMs,
    pub ends_at: TimeMs,
    pub reduced_by_action: bool,
}

/// Create a new RUNNING run ending `recipe.duration_hours` after `now`.
pub fn start_run(
    user: &UserId,
    recipe: &Recipe,
    input_quantity_used: i64,
    now: TimeMs,
) -> ProductionRun {
    ProductionRun {
        id: uuid::Uuid::new_v4().to_string(),
        user: user.clone(),
        recipe_id: recipe.id.clone(),
        input_quantity_used,
        started_at: now,
        duration_hours: recipe.duration_hours,
        ends_at: now.plus_hours(recipe.duration_hours),
        reduced_by_action: false,
        status: RunStatus::Running,
        created_at: now,
    }
}

/// Apply the one-time acceleration ("watering"), pulling `ends_at` forward by
/// `reduction_hours`. Returns false without touching the run when it was
/// already accelerated.
pub fn accelerate(run: &mut ProductionRun, reduction_hours: i64) -> bool {
    if run.reduced_by_action {
        return false;
    }
    run.ends_at = run.ends_at.minus_hours(reduction_hours);
    run.reduced_by_action = true;
    true
}

/// Mark the run DONE and yield the completion record. Returns None (no-op)
/// when the run is already DONE; completion is allowed whether or not the run
/// has reached its end timestamp.
pub fn complete(run: &mut ProductionRun) -> Option<CompletedRun> {
    match run.status {
        RunStatus::Done => None,
        RunStatus::Running => {
            run.status = RunStatus::Done;
            Some(CompletedRun {
                recipe_id: run.recipe_id.clone(),
                started_at: run.started_at,
                ends_at: run.ends_at,
                reduced_by_action: run.reduced_by_action,
            })
        }
    }
}
