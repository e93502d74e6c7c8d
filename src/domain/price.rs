//! Observed sale prices per crate type.

use crate::domain::{CrateId, TimeMs, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordered list of previously observed sale prices for one crate type.
///
/// The average of `values` is the crate's estimated unit price; an empty list
/// means no estimate (treated as zero everywhere).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub user: UserId,
    pub crate_id: CrateId,
    pub values: Vec<Decimal>,
    pub updated_at: TimeMs,
}
