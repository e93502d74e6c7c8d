//! Crate sales: estimate value from observed prices, decrement stock, ledger.

use crate::db::Repository;
use crate::domain::{CrateId, HistoryEntry, HistoryKind, Space, TimeMs, UserId};
use crate::engine::average_price;
use crate::error::AppError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct SaleService {
    repo: Arc<Repository>,
}

pub struct SaleRequest {
    pub crate_id: CrateId,
    pub quantity: i64,
    pub actual_value: Decimal,
    pub notes: Option<String>,
}

impl SaleService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Record a crate sale: freeze the estimated value from the current price
    /// observations, append the SALE entry and decrement the crate stock in
    /// one transaction. The sale is rejected when the stock cannot cover it.
    pub async fn record_sale(
        &self,
        user: &UserId,
        space: Space,
        request: SaleRequest,
        now: TimeMs,
    ) -> Result<HistoryEntry, AppError> {
        if request.quantity <= 0 {
            return Err(AppError::BadRequest(
                "sale quantity must be positive".to_string(),
            ));
        }

        let stock = self
            .repo
            .get_stock(user, space, request.crate_id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("crate {}", request.crate_id)))?;
        if stock.quantity < request.quantity {
            return Err(AppError::InsufficientStock(format!(
                "{}: need {}, have {}",
                request.crate_id, request.quantity, stock.quantity
            )));
        }

        let observed = self
            .repo
            .get_prices(user, &request.crate_id)
            .await?
            .map(|o| o.values)
            .unwrap_or_default();
        let estimated_value = average_price(&observed) * Decimal::from(request.quantity);

        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.clone(),
            created_at: now,
            kind: HistoryKind::Sale {
                crate_id: request.crate_id.clone(),
                crate_label: stock.label.clone(),
                quantity_sold: request.quantity,
                estimated_value,
                actual_value: request.actual_value,
                notes: request.notes,
            },
        };
        self.repo
            .record_sale_atomic(
                user,
                space,
                request.crate_id.as_str(),
                stock.quantity - request.quantity,
                &entry,
                now,
            )
            .await?;
        info!(
            user = user.as_str(),
            crate_id = request.crate_id.as_str(),
            quantity = request.quantity,
            "Sale recorded"
        );
        Ok(entry)
    }
}
