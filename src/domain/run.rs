//! Timed production runs and their derived lifecycle phase.

use crate::domain::{RecipeId, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Stored run status. READY is never stored; it is derived from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Done,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Done => "DONE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RUNNING" => Some(RunStatus::Running),
            "DONE" => Some(RunStatus::Done),
            _ => None,
        }
    }
}

/// Derived lifecycle phase at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunPhase {
    Running,
    Ready,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Running => "RUNNING",
            RunPhase::Ready => "READY",
            RunPhase::Done => "DONE",
        }
    }
}

/// A single timed production job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRun {
    pub id: String,
    pub user: UserId,
    pub recipe_id: RecipeId,
    pub input_quantity_used: i64,
    pub started_at: TimeMs,
    /// Duration fixed at creation; `ends_at` moves, this does not.
    pub duration_hours: i64,
    /// Monotonically non-increasing: only the one-time acceleration lowers it.
    pub ends_at: TimeMs,
    /// At most one acceleration ever applied.
    pub reduced_by_action: bool,
    pub status: RunStatus,
    pub created_at: TimeMs,
}

impl ProductionRun {
    /// Derive the lifecycle phase at `now`.
    ///
    /// `ready ⟺ status ≠ DONE ∧ now ≥ ends_at`. Takes the clock explicitly so
    /// the derivation is testable with fixed time values.
    pub fn phase(&self, now: TimeMs) -> RunPhase {
        match self.status {
            RunStatus::Done => RunPhase::Done,
            RunStatus::Running => {
                if now >= self.ends_at {
                    RunPhase::Ready
                } else {
                    RunPhase::Running
                }
            }
        }
    }

    /// Milliseconds until `ends_at`, clamped at zero.
    pub fn time_remaining_ms(&self, now: TimeMs) -> i64 {
        now.remaining_until(self.ends_at)
    }

    /// Fraction of the effective duration elapsed, clamped to [0, 1].
    pub fn progress(&self, now: TimeMs) -> f64 {
        let total = (self.ends_at.as_i64() - self.started_at.as_i64()).max(1);
        let elapsed = total - self.time_remaining_ms(now);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(started_ms: i64, duration_hours: i64) -> ProductionRun {
        let started_at = TimeMs::new(started_ms);
        ProductionRun {
            id: "run-1".to_string(),
            user: UserId::new("u1"),
            recipe_id: RecipeId::new("r1"),
            input_quantity_used: 5,
            started_at,
            duration_hours,
            ends_at: started_at.plus_hours(duration_hours),
            reduced_by_action: false,
            status: RunStatus::Running,
            created_at: started_at,
        }
    }

    #[test]
    fn test_phase_running_before_end() {
        let r = run(0, 48);
        assert_eq!(r.phase(TimeMs::new(0).plus_hours(47)), RunPhase::Running);
    }

    #[test]
    fn test_phase_ready_at_end() {
        let r = run(0, 48);
        assert_eq!(r.phase(TimeMs::new(0).plus_hours(48)), RunPhase::Ready);
        assert_eq!(r.phase(TimeMs::new(0).plus_hours(72)), RunPhase::Ready);
    }

    #[test]
    fn test_phase_done_is_terminal() {
        let mut r = run(0, 48);
        r.status = RunStatus::Done;
        assert_eq!(r.phase(TimeMs::new(0)), RunPhase::Done);
        assert_eq!(r.phase(TimeMs::new(0).plus_hours(100)), RunPhase::Done);
    }

    #[test]
    fn test_time_remaining_clamped() {
        let r = run(0, 2);
        assert_eq!(r.time_remaining_ms(TimeMs::new(0).plus_hours(1)), 3_600_000);
        assert_eq!(r.time_remaining_ms(TimeMs::new(0).plus_hours(3)), 0);
    }

    #[test]
    fn test_progress_bounds() {
        let r = run(0, 2);
        assert_eq!(r.progress(TimeMs::new(0)), 0.0);
        assert_eq!(r.progress(TimeMs::new(0).plus_hours(1)), 0.5);
        assert_eq!(r.progress(TimeMs::new(0).plus_hours(5)), 1.0);
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(RunStatus::parse("RUNNING"), Some(RunStatus::Running));
        assert_eq!(RunStatus::parse("DONE"), Some(RunStatus::Done));
        assert_eq!(RunStatus::parse("READY"), None);
    }
}
