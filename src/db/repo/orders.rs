//! Order operations.

use super::Repository;
use crate::domain::{Order, OrderItem, OrderStatus, Recipient, Space, TimeMs, UserId};
use sqlx::Row;
use tracing::warn;

fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Option<Order> {
    let id: String = row.get("id");
    let user: String = row.get("user");
    let space: String = row.get("space");
    let recipient: String = row.get("recipient");
    let items: String = row.get("items");
    let total_amount: String = row.get("total_amount");
    let status: String = row.get("status");
    let completed_at: Option<i64> = row.get("completed_at");

    let recipient = match serde_json::from_str::<Recipient>(&recipient) {
        Ok(r) => r,
        Err(e) => {
            warn!(order_id = %id, error = %e, "Skipping order with unreadable recipient");
            return None;
        }
    };
    let items = match serde_json::from_str::<Vec<OrderItem>>(&items) {
        Ok(i) => i,
        Err(e) => {
            warn!(order_id = %id, error = %e, "Skipping order with unreadable items");
            return None;
        }
    };

    Some(Order {
        id,
        user: UserId::new(user),
        space: Space::parse(&space).unwrap_or(Space::Crafting),
        recipient,
        items,
        total_amount: super::parse_decimal("orders.total_amount", &total_amount),
        status: OrderStatus::parse(&status).unwrap_or(OrderStatus::Pending),
        created_at: TimeMs::new(row.get("created_at")),
        completed_at: completed_at.map(TimeMs::new),
    })
}

impl Repository {
    /// Insert a new order.
    pub async fn insert_order(&self, order: &Order) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO orders
            (id, user, space, recipient, items, total_amount, status, created_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(order.user.as_str())
        .bind(order.space.as_str())
        .bind(serde_json::to_string(&order.recipient).unwrap_or_else(|_| "{}".to_string()))
        .bind(serde_json::to_string(&order.items).unwrap_or_else(|_| "[]".to_string()))
        .bind(order.total_amount.to_string())
        .bind(order.status.as_str())
        .bind(order.created_at.as_i64())
        .bind(order.completed_at.map(|t| t.as_i64()))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Fetch one order scoped to its owner.
    pub async fn get_order(
        &self,
        user: &UserId,
        order_id: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM orders WHERE user = ? AND id = ?")
            .bind(user.as_str())
            .bind(order_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.as_ref().and_then(row_to_order))
    }

    /// List a user's orders, most recent first, optionally filtered by status.
    pub async fn list_orders(
        &self,
        user: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT * FROM orders WHERE user = ? AND status = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(user.as_str())
                .bind(status.as_str())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM orders WHERE user = ? ORDER BY created_at DESC, id DESC")
                    .bind(user.as_str())
                    .fetch_all(self.pool())
                    .await?
            }
        };
        Ok(rows.iter().filter_map(row_to_order).collect())
    }

    /// Mark a pending order completed. The status guard makes completion
    /// idempotent: a second call finds no pending row and returns `false`.
    pub async fn complete_order(
        &self,
        user: &UserId,
        order_id: &str,
        now: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?, completed_at = ?
            WHERE user = ? AND id = ? AND status = ?
            "#,
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(now.as_i64())
        .bind(user.as_str())
        .bind(order_id)
        .bind(OrderStatus::Pending.as_str())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one order. Returns whether a row was removed.
    pub async fn delete_order(&self, user: &UserId, order_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE user = ? AND id = ?")
            .bind(user.as_str())
            .bind(order_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_db;
    use crate::domain::{
        Order, OrderItem, OrderStatus, Recipient, Space, TimeMs, UserId,
    };
    use rust_decimal::Decimal;

    fn material_item(name: &str, qty: i64, unit_price: i64) -> OrderItem {
        OrderItem::Material {
            material_id: crate::domain::MaterialId::new(name),
            material_name: name.to_string(),
            requested_qty: qty,
            unit_price: Decimal::from(unit_price),
            total_price: Decimal::from(qty * unit_price),
        }
    }

    fn order(id: &str, user: &UserId, created_at: i64) -> Order {
        let items = vec![material_item("acier", 10, 5)];
        Order {
            id: id.to_string(),
            user: user.clone(),
            space: Space::Crafting,
            recipient: Recipient::Person {
                name: "Marco".to_string(),
            },
            total_amount: items.iter().map(OrderItem::total_price).sum(),
            items,
            status: OrderStatus::Pending,
            created_at: TimeMs::new(created_at),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_order_roundtrip_and_status_filter() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1");

        repo.insert_order(&order("o1", &user, 1_000)).await.unwrap();
        repo.insert_order(&order("o2", &user, 2_000)).await.unwrap();
        repo.complete_order(&user, "o1", TimeMs::new(3_000))
            .await
            .unwrap();

        let all = repo.list_orders(&user, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "o2");

        let pending = repo
            .list_orders(&user, Some(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "o2");

        let completed = repo.get_order(&user, "o1").await.unwrap().unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.completed_at, Some(TimeMs::new(3_000)));
        assert_eq!(completed.total_amount, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1");
        repo.insert_order(&order("o1", &user, 1_000)).await.unwrap();

        assert!(repo.complete_order(&user, "o1", TimeMs::new(2_000)).await.unwrap());
        assert!(!repo.complete_order(&user, "o1", TimeMs::new(3_000)).await.unwrap());

        // The first completion time sticks.
        let stored = repo.get_order(&user, "o1").await.unwrap().unwrap();
        assert_eq!(stored.completed_at, Some(TimeMs::new(2_000)));
    }

    #[tokio::test]
    async fn test_delete_order_scoped_to_owner() {
        let (repo, _temp) = setup_test_db().await;
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        repo.insert_order(&order("o1", &alice, 1_000)).await.unwrap();

        assert!(!repo.delete_order(&bob, "o1").await.unwrap());
        assert!(repo.delete_order(&alice, "o1").await.unwrap());
        assert!(repo.get_order(&alice, "o1").await.unwrap().is_none());
    }
}
