//! Order composer: builds an order item by item before one atomic save.
//!
//! Each added line goes through the batch calculator independently; the order
//! total is always derived from the current items, never stored mid-edit.

use crate::domain::{Material, Order, OrderItem, OrderItemMaterial, Recipe, Recipient, Space,
    TimeMs, UserId};
use crate::engine::calculator::{flat_item_total, BatchPlan};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("unit price must be positive")]
    InvalidPrice,
    #[error("no such item index: {0}")]
    NoSuchItem(usize),
    #[error("order has no items")]
    EmptyOrder,
}

/// An in-progress order being assembled.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    items: Vec<OrderItem>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a recipe line. The requested quantity is batch-rounded up and the
    /// line is priced on the actual (rounded) production.
    pub fn add_recipe_item(
        &mut self,
        recipe: &Recipe,
        requested_qty: i64,
        material_names: &dyn Fn(&crate::domain::MaterialId) -> String,
    ) -> Result<(), ComposeError> {
        if requested_qty <= 0 {
            return Err(ComposeError::InvalidQuantity);
        }
        let plan = BatchPlan::for_recipe(recipe, requested_qty);
        let materials = plan
            .materials
            .iter()
            .map(|need| OrderItemMaterial {
                material_id: need.material_id.clone(),
                material_name: material_names(&need.material_id),
                quantity: need.total_needed,
            })
            .collect();

        self.items.push(OrderItem::Recipe {
            recipe_id: recipe.id.clone(),
            recipe_name: recipe.name.clone(),
            requested_qty,
            batch_size: plan.batch_size,
            crafts_needed: plan.crafts_needed,
            actual_production: plan.actual_production,
            surplus: plan.surplus,
            unit_price: recipe.unit_price,
            total_price: plan.total_price,
            materials,
        });
        Ok(())
    }

    /// Add a flat material-sale line at a user-entered unit price.
    pub fn add_material_item(
        &mut self,
        material: &Material,
        requested_qty: i64,
        unit_price: Decimal,
    ) -> Result<(), ComposeError> {
        if requested_qty <= 0 {
            return Err(ComposeError::InvalidQuantity);
        }
        if unit_price <= Decimal::ZERO {
            return Err(ComposeError::InvalidPrice);
        }
        self.items.push(OrderItem::Material {
            material_id: material.id.clone(),
            material_name: material.name.clone(),
            requested_qty,
            unit_price,
            total_price: flat_item_total(requested_qty, unit_price),
        });
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<(), ComposeError> {
        if index >= self.items.len() {
            return Err(ComposeError::NoSuchItem(index));
        }
        self.items.remove(index);
        Ok(())
    }

    /// Re-price one line. Recipe lines keep charging for the whole rounded
    /// production; material lines for the requested quantity.
    pub fn update_item_price(
        &mut self,
        index: usize,
        new_unit_price: Decimal,
    ) -> Result<(), ComposeError> {
        if new_unit_price <= Decimal::ZERO {
            return Err(ComposeError::InvalidPrice);
        }
        let item = self
            .items
            .get_mut(index)
            .ok_or(ComposeError::NoSuchItem(index))?;
        match item {
            OrderItem::Recipe {
                unit_price,
                total_price,
                actual_production,
                ..
            } => {
                *unit_price = new_unit_price;
                *total_price = Decimal::from(*actual_production) * new_unit_price;
            }
            OrderItem::Material {
                unit_price,
                total_price,
                requested_qty,
                ..
            } => {
                *unit_price = new_unit_price;
                *total_price = Decimal::from(*requested_qty) * new_unit_price;
            }
        }
        Ok(())
    }

    /// Derived at read time: sum of all item totals.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(|item| item.total_price()).sum()
    }

    /// Finalize into a pending order for `recipient`. Fails on an empty draft.
    pub fn into_order(
        self,
        user: &UserId,
        space: Space,
        recipient: Recipient,
        now: TimeMs,
    ) -> Result<Order, ComposeError> {
        if self.items.is_empty() {
            return Err(ComposeError::EmptyOrder);
        }
        let total_amount = self.total_amount();
        Ok(Order {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.clone(),
            space,
            recipient,
            items: self.items,
            total_amount,
            status: crate::domain::OrderStatus::Pending,
            created_at: now,
            completed_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MaterialId, RecipeId};
    use std::collections::BTreeMap;

    fn recipe(batch_size: i64, unit_price: i64) -> Recipe {
        Recipe {
            id: RecipeId::new("r1"),
            space: Space::Crafting,
            name: "Tec-9".to_string(),
            category: Some("armes".to_string()),
            batch_size,
            duration_hours: 24,
            unit_price: Decimal::from(unit_price),
            tool_cost: None,
            materials: BTreeMap::from([(MaterialId::new("m1"), 2)]),
        }
    }

    fn material() -> Material {
        Material {
            id: MaterialId::new("m1"),
            space: Space::Crafting,
            name: "Acier".to_string(),
            unit: "unités".to_string(),
        }
    }

    fn names(id: &MaterialId) -> String {
        id.as_str().to_string()
    }

    #[test]
    fn test_totals_follow_items() {
        let mut draft = OrderDraft::new();
        // 10 requested on batch 10 @ 5 => total 50.
        draft.add_recipe_item(&recipe(10, 5), 10, &names).unwrap();
        // 3 requested on batch 3 @ 20 => total 60.
        draft.add_recipe_item(&recipe(3, 20), 3, &names).unwrap();
        assert_eq!(draft.total_amount(), Decimal::from(110));

        // Editing the first item's unit price re-derives the order total.
        draft.update_item_price(0, Decimal::from(7)).unwrap();
        assert_eq!(draft.total_amount(), Decimal::from(130));
    }

    #[test]
    fn test_recipe_item_carries_batch_math() {
        let mut draft = OrderDraft::new();
        draft.add_recipe_item(&recipe(8, 5), 10, &names).unwrap();
        match &draft.items()[0] {
            OrderItem::Recipe {
                crafts_needed,
                actual_production,
                surplus,
                total_price,
                materials,
                ..
            } => {
                assert_eq!(*crafts_needed, 2);
                assert_eq!(*actual_production, 16);
                assert_eq!(*surplus, 6);
                assert_eq!(*total_price, Decimal::from(80));
                assert_eq!(materials[0].quantity, 4);
            }
            OrderItem::Material { .. } => panic!("expected a recipe item"),
        }
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let mut draft = OrderDraft::new();
        assert_eq!(
            draft.add_recipe_item(&recipe(1, 5), 0, &names),
            Err(ComposeError::InvalidQuantity)
        );
        assert_eq!(
            draft.add_material_item(&material(), 3, Decimal::ZERO),
            Err(ComposeError::InvalidPrice)
        );
        assert_eq!(
            draft.add_material_item(&material(), -1, Decimal::from(5)),
            Err(ComposeError::InvalidQuantity)
        );
        assert!(draft.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut draft = OrderDraft::new();
        draft
            .add_material_item(&material(), 2, Decimal::from(10))
            .unwrap();
        assert_eq!(draft.remove_item(3), Err(ComposeError::NoSuchItem(3)));
        draft.remove_item(0).unwrap();
        assert!(draft.is_empty());
        assert_eq!(draft.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_draft_cannot_become_order() {
        let draft = OrderDraft::new();
        let result = draft.into_order(
            &UserId::new("u1"),
            Space::Crafting,
            Recipient::Person {
                name: "Mika".to_string(),
            },
            TimeMs::new(0),
        );
        assert!(matches!(result, Err(ComposeError::EmptyOrder)));
    }

    #[test]
    fn test_into_order_snapshots_total() {
        let mut draft = OrderDraft::new();
        draft
            .add_material_item(&material(), 4, Decimal::from(25))
            .unwrap();
        let order = draft
            .into_order(
                &UserId::new("u1"),
                Space::Crafting,
                Recipient::Person {
                    name: "Mika".to_string(),
                },
                TimeMs::new(9),
            )
            .unwrap();
        assert_eq!(order.total_amount, Decimal::from(100));
        assert_eq!(order.status, crate::domain::OrderStatus::Pending);
        assert_eq!(order.completed_at, None);
    }
}
