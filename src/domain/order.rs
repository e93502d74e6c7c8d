//! Multi-item customer orders.

use crate::domain::{GroupId, MaterialId, RecipeId, Space, TimeMs, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

/// Who the order is for: an existing group or a named individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recipient {
    Group { id: GroupId, name: String },
    Person { name: String },
}

impl Recipient {
    pub fn display_name(&self) -> &str {
        match self {
            Recipient::Group { name, .. } => name,
            Recipient::Person { name } => name,
        }
    }
}

/// One material requirement carried on a recipe order item, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemMaterial {
    pub material_id: MaterialId,
    pub material_name: String,
    pub quantity: i64,
}

/// One line of an order, batch-rounded independently of the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderItem {
    /// A recipe-based item; the price covers the whole rounded production.
    Recipe {
        recipe_id: RecipeId,
        recipe_name: String,
        requested_qty: i64,
        batch_size: i64,
        crafts_needed: i64,
        actual_production: i64,
        surplus: i64,
        unit_price: Decimal,
        total_price: Decimal,
        materials: Vec<OrderItemMaterial>,
    },
    /// A flat material sale at a user-entered unit price.
    Material {
        material_id: MaterialId,
        material_name: String,
        requested_qty: i64,
        unit_price: Decimal,
        total_price: Decimal,
    },
}

impl OrderItem {
    pub fn total_price(&self) -> Decimal {
        match self {
            OrderItem::Recipe { total_price, .. } => *total_price,
            OrderItem::Material { total_price, .. } => *total_price,
        }
    }
}

/// A persisted order. `total_amount` always equals the sum of item totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user: UserId,
    pub space: Space,
    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: TimeMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<TimeMs>,
}
