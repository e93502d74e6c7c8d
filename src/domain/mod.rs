//! Domain types for the game-economy tracker.
//!
//! This module provides:
//! - Domain primitives: TimeMs, Space, and the id newtypes
//! - Catalog types: Recipe, Material, Group
//! - Per-user entities: ProductionRun, StockEntry, PriceObservation,
//!   HistoryEntry, Order, LaunderEntry
//!
//! History entries and order items are proper tagged unions, matched
//! exhaustively at every consumption site.

pub mod history;
pub mod laundry;
pub mod order;
pub mod price;
pub mod primitives;
pub mod recipe;
pub mod run;
pub mod stock;

pub use history::{HistoryEntry, HistoryKind, ProductionRecord};
pub use laundry::LaunderEntry;
pub use order::{Order, OrderItem, OrderItemMaterial, OrderStatus, Recipient};
pub use price::PriceObservation;
pub use primitives::{CrateId, GroupId, MaterialId, RecipeId, Space, TimeMs, UserId};
pub use recipe::{Group, Material, Recipe};
pub use run::{ProductionRun, RunPhase, RunStatus};
pub use stock::StockEntry;
