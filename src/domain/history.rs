//! Append-only history of completed transformations and crate sales.

use crate::domain::{CrateId, MaterialId, RecipeId, TimeMs, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One history entry; never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub user: UserId,
    pub created_at: TimeMs,
    #[serde(flatten)]
    pub kind: HistoryKind,
}

/// Tagged payload of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum HistoryKind {
    /// A completed timed production run.
    Transformation {
        recipe_id: RecipeId,
        started_at: TimeMs,
        ends_at: TimeMs,
        reduced_by_action: bool,
    },
    /// A crate sale: estimated value at sale time vs what was actually paid.
    Sale {
        crate_id: CrateId,
        crate_label: String,
        quantity_sold: i64,
        estimated_value: Decimal,
        actual_value: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl HistoryEntry {
    pub fn is_sale(&self) -> bool {
        matches!(self.kind, HistoryKind::Sale { .. })
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self.kind, HistoryKind::Transformation { .. })
    }
}

/// Record of one validated production: the crafts run and the materials they
/// consumed. Written atomically with the corresponding stock decrements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub id: String,
    pub user: UserId,
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub crafts_count: i64,
    pub desired_qty: i64,
    pub actual_production: i64,
    pub materials_consumed: BTreeMap<MaterialId, i64>,
    pub created_at: TimeMs,
}
