//! Quantity/batch calculator.
//!
//! Converts a recipe and a desired output quantity into crafts needed, actual
//! production, surplus, material consumption, and price. Batch count always
//! rounds up: partial batches cannot be produced, so actual production never
//! falls short of the request.

use crate::domain::{MaterialId, Recipe};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Total consumption of one material across all crafts of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialNeed {
    pub material_id: MaterialId,
    pub qty_per_craft: i64,
    pub total_needed: i64,
}

/// The derived numbers for producing `desired_qty` units of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub desired_qty: i64,
    pub batch_size: i64,
    pub crafts_needed: i64,
    pub actual_production: i64,
    pub surplus: i64,
    pub materials: Vec<MaterialNeed>,
    /// actual_production × unit_price.
    pub total_price: Decimal,
    /// crafts_needed × tool_cost, when the recipe carries a tool.
    pub total_tool_cost: Option<Decimal>,
}

impl BatchPlan {
    /// Plan the crafts for `desired_qty` units. A desired quantity of zero
    /// yields an all-zero plan, not an error.
    pub fn for_recipe(recipe: &Recipe, desired_qty: i64) -> Self {
        let desired_qty = desired_qty.max(0);
        let crafts_needed = if desired_qty == 0 {
            0
        } else {
            // ceil(desired / batch_size); batch_size >= 1 per catalog invariant.
            (desired_qty + recipe.batch_size - 1) / recipe.batch_size
        };
        let actual_production = crafts_needed * recipe.batch_size;
        let surplus = actual_production - desired_qty;

        let materials = recipe
            .materials
            .iter()
            .map(|(material_id, qty_per_craft)| MaterialNeed {
                material_id: material_id.clone(),
                qty_per_craft: *qty_per_craft,
                total_needed: qty_per_craft * crafts_needed,
            })
            .collect();

        BatchPlan {
            desired_qty,
            batch_size: recipe.batch_size,
            crafts_needed,
            actual_production,
            surplus,
            materials,
            total_price: Decimal::from(actual_production) * recipe.unit_price,
            total_tool_cost: recipe
                .tool_cost
                .map(|cost| cost * Decimal::from(crafts_needed)),
        }
    }

    /// Number of tools consumed, one per craft.
    pub fn tools_required(&self) -> i64 {
        self.crafts_needed
    }
}

/// Total for a flat material-sale line: quantity × user-entered unit price.
pub fn flat_item_total(quantity: i64, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity.max(0)) * unit_price
}

/// One material the available stock cannot cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub material_id: MaterialId,
    pub needed: i64,
    pub available: i64,
    pub missing: i64,
}

/// Outcome of checking a plan against available material stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityReport {
    pub producible: bool,
    pub shortfalls: Vec<Shortfall>,
}

/// Check whether every material need of `plan` is covered by `available`.
///
/// Materials absent from `available` count as zero stock. A plan with zero
/// crafts is trivially producible: it has nothing to check.
pub fn check_feasibility(
    plan: &BatchPlan,
    available: &HashMap<MaterialId, i64>,
) -> FeasibilityReport {
    let mut shortfalls = Vec::new();
    for need in &plan.materials {
        let on_hand = available.get(&need.material_id).copied().unwrap_or(0);
        if on_hand < need.total_needed {
            shortfalls.push(Shortfall {
                material_id: need.material_id.clone(),
                needed: need.total_needed,
                available: on_hand,
                missing: need.total_needed - on_hand,
            });
        }
    }
    FeasibilityReport {
        producible: shortfalls.is_empty(),
        shortfalls,
    }
}
