//! Per-user stock levels for materials and crates.

use crate::domain::{Space, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// Quantity on hand of one material or crate type for one user.
///
/// `item_id` refers to a material (crafting space) or a crate (potions space);
/// the two pools never mix because every entry carries its space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub user: UserId,
    pub space: Space,
    pub item_id: String,
    pub label: String,
    /// Never negative; manual decrements clamp at zero.
    pub quantity: i64,
    pub updated_at: TimeMs,
}

impl StockEntry {
    /// Apply a manual delta, clamping the result at zero.
    pub fn adjusted(&self, delta: i64) -> i64 {
        (self.quantity + delta).max(0)
    }
}
