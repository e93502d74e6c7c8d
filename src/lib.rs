pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    CrateId, GroupId, HistoryEntry, HistoryKind, LaunderEntry, Material, MaterialId, Order,
    OrderItem, OrderStatus, PriceObservation, ProductionRecord, ProductionRun, Recipe, RecipeId,
    Recipient, RunPhase, RunStatus, Space, StockEntry, TimeMs, UserId,
};
pub use error::AppError;
pub use orchestration::Ticker;
