//! Valuation and history aggregation.
//!
//! Combines stock quantities, recorded price observations, and ledger entries
//! into the derived figures the dashboards show: average prices, stock value,
//! rolling sale revenue, per-day history grouping, and laundering balances.

use crate::domain::{HistoryEntry, HistoryKind, LaunderEntry, Order, OrderStatus,
    PriceObservation, StockEntry, TimeMs};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Arithmetic mean of the observed prices, rounded to the nearest integer
/// (midpoint away from zero). Zero when no observation exists.
pub fn average_price(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    (sum / Decimal::from(values.len() as i64))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Estimated value of one stock line.
pub fn stock_value(quantity: i64, avg_price: Decimal) -> Decimal {
    Decimal::from(quantity) * avg_price
}

/// Total estimated value across stock entries. Entries with no price
/// observation contribute zero.
pub fn total_stock_value(stocks: &[StockEntry], prices: &[PriceObservation]) -> Decimal {
    let averages: HashMap<&str, Decimal> = prices
        .iter()
        .map(|p| (p.crate_id.as_str(), average_price(&p.values)))
        .collect();

    stocks
        .iter()
        .map(|stock| {
            let avg = averages
                .get(stock.item_id.as_str())
                .copied()
                .unwrap_or(Decimal::ZERO);
            stock_value(stock.quantity, avg)
        })
        .sum()
}

/// Sale revenue over a rolling window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RevenueSummary {
    pub revenue: Decimal,
    pub crates_sold: i64,
    pub sale_count: i64,
}

/// Sum the actual value of SALE entries created at or after `window_start`.
pub fn windowed_revenue(entries: &[HistoryEntry], window_start: TimeMs) -> RevenueSummary {
    let mut summary = RevenueSummary::default();
    for entry in entries {
        if entry.created_at < window_start {
            continue;
        }
        match &entry.kind {
            HistoryKind::Sale {
                actual_value,
                quantity_sold,
                ..
            } => {
                summary.revenue += *actual_value;
                summary.crates_sold += *quantity_sold;
                summary.sale_count += 1;
            }
            HistoryKind::Transformation { .. } => {}
        }
    }
    summary
}

/// Partition history entries by user-local calendar day.
///
/// Days come back newest first; entries within a day keep descending
/// `created_at` order.
pub fn group_by_day(
    entries: &[HistoryEntry],
    offset: FixedOffset,
) -> Vec<(NaiveDate, Vec<HistoryEntry>)> {
    let mut sorted: Vec<&HistoryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut days: Vec<(NaiveDate, Vec<HistoryEntry>)> = Vec::new();
    for entry in sorted {
        let day = DateTime::from_timestamp_millis(entry.created_at.as_i64())
            .unwrap_or_default()
            .with_timezone(&offset)
            .date_naive();
        match days.last_mut() {
            Some((last_day, bucket)) if *last_day == day => bucket.push(entry.clone()),
            _ => days.push((day, vec![entry.clone()])),
        }
    }
    days
}

/// The per-operation laundering conversion: dirty × percentage / 100.
pub fn launder_clean_amount(dirty: Decimal, percentage: u32) -> Decimal {
    dirty * Decimal::from(percentage) / Decimal::from(100)
}

/// Rolled-up laundering ledger figures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunderTotals {
    pub total_dirty: Decimal,
    pub total_clean: Decimal,
    pub owed_to_house: Decimal,
    pub net_balance: Decimal,
}

/// Aggregate a laundering ledger. The house cut applies to the total dirty
/// amount regardless of the per-entry percentage each operation used.
pub fn launder_totals(entries: &[LaunderEntry], house_cut_percent: u32) -> LaunderTotals {
    let total_dirty: Decimal = entries.iter().map(|e| e.dirty_amount).sum();
    let total_clean: Decimal = entries.iter().map(|e| e.clean_amount).sum();
    let owed_to_house = total_dirty * Decimal::from(house_cut_percent) / Decimal::from(100);
    LaunderTotals {
        total_dirty,
        total_clean,
        owed_to_house,
        net_balance: total_clean - owed_to_house,
    }
}

/// Sum of `total_amount` over completed orders.
pub fn completed_order_total(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CrateId, RecipeId, Space, UserId};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_average_price_empty_is_zero() {
        assert_eq!(average_price(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_average_price_rounding() {
        assert_eq!(average_price(&[dec(10), dec(20)]), dec(15));
        // round(33/3) = 11
        assert_eq!(average_price(&[dec(10), dec(11), dec(12)]), dec(11));
        // .5 rounds up
        assert_eq!(average_price(&[dec(1), dec(2)]), dec(2));
    }

    fn stock(item_id: &str, quantity: i64) -> StockEntry {
        StockEntry {
            user: UserId::new("u1"),
            space: Space::Potions,
            item_id: item_id.to_string(),
            label: item_id.to_string(),
            quantity,
            updated_at: TimeMs::new(0),
        }
    }

    fn price(crate_id: &str, values: &[i64]) -> PriceObservation {
        PriceObservation {
            user: UserId::new("u1"),
            crate_id: CrateId::new(crate_id),
            values: values.iter().map(|v| dec(*v)).collect(),
            updated_at: TimeMs::new(0),
        }
    }

    #[test]
    fn test_total_stock_value() {
        let stocks = vec![stock("crate-a", 5)];
        let prices = vec![price("crate-a", &[100, 200])];
        // 5 × round(150) = 750
        assert_eq!(total_stock_value(&stocks, &prices), dec(750));
    }

    #[test]
    fn test_unpriced_stock_contributes_zero() {
        let stocks = vec![stock("crate-a", 5), stock("crate-b", 9)];
        let prices = vec![price("crate-a", &[10])];
        assert_eq!(total_stock_value(&stocks, &prices), dec(50));
    }

    fn sale(created_ms: i64, actual: i64, qty: i64) -> HistoryEntry {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user: UserId::new("u1"),
            created_at: TimeMs::new(created_ms),
            kind: HistoryKind::Sale {
                crate_id: CrateId::new("crate-a"),
                crate_label: "Caisse A".to_string(),
                quantity_sold: qty,
                estimated_value: dec(actual),
                actual_value: dec(actual),
                notes: None,
            },
        }
    }

    fn transformation(created_ms: i64) -> HistoryEntry {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user: UserId::new("u1"),
            created_at: TimeMs::new(created_ms),
            kind: HistoryKind::Transformation {
                recipe_id: RecipeId::new("r1"),
                started_at: TimeMs::new(0),
                ends_at: TimeMs::new(1),
                reduced_by_action: false,
            },
        }
    }

    #[test]
    fn test_windowed_revenue_filters_by_window_and_kind() {
        let entries = vec![
            sale(1_000, 100, 2),
            sale(5_000, 250, 3),
            transformation(6_000),
            sale(500, 999, 1), // before the window
        ];
        let summary = windowed_revenue(&entries, TimeMs::new(1_000));
        assert_eq!(summary.revenue, dec(350));
        assert_eq!(summary.crates_sold, 5);
        assert_eq!(summary.sale_count, 2);
    }

    #[test]
    fn test_group_by_day_orders_descending() {
        const DAY: i64 = 24 * 60 * 60 * 1000;
        let entries = vec![sale(DAY + 100, 1, 1), sale(3 * DAY, 2, 1), sale(DAY, 3, 1)];
        let grouped = group_by_day(&entries, FixedOffset::east_opt(0).unwrap());
        assert_eq!(grouped.len(), 2);
        // Newest day first.
        assert!(grouped[0].0 > grouped[1].0);
        // Within a day, newest entry first.
        assert_eq!(grouped[1].1[0].created_at, TimeMs::new(DAY + 100));
        assert_eq!(grouped[1].1[1].created_at, TimeMs::new(DAY));
    }

    fn launder(dirty: i64, percentage: u32) -> LaunderEntry {
        LaunderEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user: UserId::new("u1"),
            dirty_amount: dec(dirty),
            percentage,
            clean_amount: launder_clean_amount(dec(dirty), percentage),
            for_boss: false,
            created_at: TimeMs::new(0),
        }
    }

    #[test]
    fn test_launder_clean_amount() {
        assert_eq!(launder_clean_amount(dec(1_000), 20), dec(200).normalize());
        assert_eq!(launder_clean_amount(dec(1_000), 30), dec(300).normalize());
    }

    #[test]
    fn test_launder_totals_single_entry() {
        // dirty=1000 @ 20% => clean=200; owed = 50% of 1000 = 500; net = -300.
        let totals = launder_totals(&[launder(1_000, 20)], 50);
        assert_eq!(totals.total_dirty, dec(1_000));
        assert_eq!(totals.total_clean.normalize(), dec(200));
        assert_eq!(totals.owed_to_house.normalize(), dec(500));
        assert_eq!(totals.net_balance.normalize(), dec(-300));
    }

    #[test]
    fn test_house_cut_independent_of_entry_percentage() {
        let totals = launder_totals(&[launder(1_000, 20), launder(1_000, 30)], 50);
        assert_eq!(totals.total_clean.normalize(), dec(500));
        assert_eq!(totals.owed_to_house.normalize(), dec(1_000));
        assert_eq!(totals.net_balance.normalize(), dec(-500));
    }
}
