//! Catalog types: recipes, raw materials, and order-recipient groups.
//!
//! Catalog entries are seeded once and read-only afterwards; they are shared
//! across all users.

use crate::domain::{GroupId, MaterialId, RecipeId, Space};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A production recipe (a.k.a. transformation).
///
/// Each craft consumes the material map once and produces `batch_size` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub space: Space,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Units produced per craft, >= 1; partial batches cannot be produced.
    pub batch_size: i64,
    /// Timed-run duration in hours, > 0.
    pub duration_hours: i64,
    /// Sale price per produced unit.
    pub unit_price: Decimal,
    /// Per-craft tool cost (potions space only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_cost: Option<Decimal>,
    /// Material requirements per craft, keyed by material id.
    pub materials: BTreeMap<MaterialId, i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipeError {
    #[error("recipe {0}: batch_size must be >= 1")]
    InvalidBatchSize(RecipeId),
    #[error("recipe {0}: duration_hours must be > 0")]
    InvalidDuration(RecipeId),
}

impl Recipe {
    /// Check the catalog invariants. Run at seed time, before persisting.
    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.batch_size < 1 {
            return Err(RecipeError::InvalidBatchSize(self.id.clone()));
        }
        if self.duration_hours <= 0 {
            return Err(RecipeError::InvalidDuration(self.id.clone()));
        }
        Ok(())
    }
}

/// A raw material tracked as stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub space: Space,
    pub name: String,
    /// Display unit label, e.g. "kg" or "unités".
    pub unit: String,
}

/// A named group that orders can be placed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}
