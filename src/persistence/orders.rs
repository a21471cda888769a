//! Order persistence: insert, status updates, listing newest first.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::PgStore;
use super::store::{OrderStore, StoreError, StoreResult};
use crate::types::order::{Order, OrderItem, OrderStatus, PaymentStatus};

const ORDER_COLUMNS: &str = "id, user_id, items, total_amount, shipping_address, status, \
                             payment_status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    items: Json<Vec<OrderItem>>,
    total_amount: f64,
    shipping_address: String,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Convert a row into an [`Order`]. Fails on status strings outside the enums.
fn order_row_to_order(row: OrderRow) -> StoreResult<Order> {
    let status = row.status.parse::<OrderStatus>().map_err(|e| StoreError::Corrupt {
        id: row.id,
        reason: format!("status: {e}"),
    })?;
    let payment_status = row
        .payment_status
        .parse::<PaymentStatus>()
        .map_err(|e| StoreError::Corrupt {
            id: row.id,
            reason: format!("payment_status: {e}"),
        })?;
    Ok(Order {
        id: row.id,
        user_id: row.user_id,
        items: row.items.0,
        total_amount: row.total_amount,
        shipping_address: row.shipping_address,
        status,
        payment_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_orders(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(order_row_to_order).collect()
}

impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, items, total_amount, shipping_address, status, \
             payment_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order.id)
        .bind(&order.user_id)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.shipping_address)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows_to_orders(rows)
    }

    async fn list_orders_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows_to_orders(rows)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(order_row_to_order).transpose()
    }

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(order_row_to_order).transpose()
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET payment_status = $1, updated_at = $2 WHERE id = $3 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(payment_status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(order_row_to_order).transpose()
    }
}
