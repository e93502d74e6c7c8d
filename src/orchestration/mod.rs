//! Orchestration: services coordinating the pure engine with persistence.

pub mod clock;
pub mod production;
pub mod runs;
pub mod sales;

pub use clock::Ticker;
pub use production::{PlanPreview, ProductionService};
pub use runs::RunService;
pub use sales::SaleService;
