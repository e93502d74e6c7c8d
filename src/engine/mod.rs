//! Pure calculation and state-transition engine.
//!
//! Everything here is synchronous arithmetic over domain types. Persistence
//! and clocks are the caller's concern; functions that depend on the current
//! time take an explicit `now` parameter.

pub mod calculator;
pub mod composer;
pub mod timer;
pub mod valuation;

pub use calculator::{check_feasibility, BatchPlan, FeasibilityReport, MaterialNeed, Shortfall};
pub use composer::{ComposeError, OrderDraft};
pub use timer::{accelerate, complete, start_run, CompletedRun};
pub use valuation::{
    average_price, completed_order_total, group_by_day, launder_clean_amount, launder_totals,
    stock_value, total_stock_value, windowed_revenue, LaunderTotals, RevenueSummary,
};
