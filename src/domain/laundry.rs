//! Money-laundering ledger entries.

use crate::domain::{TimeMs, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One laundering operation: a dirty amount converted at a chosen percentage.
///
/// `clean_amount` is the user's own gain (`dirty × percentage / 100`). The
/// fixed house cut is a separate business rule applied over the whole ledger,
/// never stored per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunderEntry {
    pub id: String,
    pub user: UserId,
    pub dirty_amount: Decimal,
    /// Per-operation conversion rate the user selected (e.g. 20 or 30).
    pub percentage: u32,
    pub clean_amount: Decimal,
    /// Marks an operation run on behalf of the boss.
    pub for_boss: bool,
    pub created_at: TimeMs,
}
