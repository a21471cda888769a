//! Order service handlers, mounted at `/api/orders`.
//!
//! Status changes are accepted in any direction; the only lifecycle rule is
//! that shipped or delivered orders cannot be cancelled.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{ValidJson, non_blank, parse_id};
use crate::error::ApiError;
use crate::persistence::OrderStore;
use crate::types::order::{Order, OrderItem, OrderStatus, PaymentStatus};

const ORDER_NOT_FOUND: &str = "Order not found";

pub fn routes<S: OrderStore>() -> Router<S> {
    Router::new()
        .route("/api/orders", get(list_orders::<S>).post(create_order::<S>))
        .route("/api/orders/user/{user_id}", get(list_orders_by_user::<S>))
        .route("/api/orders/{id}", get(get_order::<S>))
        .route("/api/orders/{id}/status", patch(update_status::<S>))
        .route("/api/orders/{id}/payment", patch(update_payment_status::<S>))
        .route("/api/orders/{id}/cancel", patch(cancel_order::<S>))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Option<String>,
    /// Kept untyped so a non-array value gets the "at least one item" message.
    pub items: Option<Value>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemRequest {
    product_id: Option<String>,
    name: Option<String>,
    quantity: Option<i64>,
    price: Option<f64>,
}

impl CreateOrderRequest {
    /// Validate and build a new Pending order. `totalAmount` is taken as given.
    pub fn into_order(self) -> Result<Order, ApiError> {
        let (Some(user_id), Some(items), Some(total_amount), Some(shipping_address)) = (
            non_blank(self.user_id),
            self.items,
            self.total_amount,
            non_blank(self.shipping_address),
        ) else {
            return Err(ApiError::validation("All fields are required"));
        };

        let items = match items {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(ApiError::validation("Order must contain at least one item")),
        };
        let items = items
            .into_iter()
            .map(parse_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order::new(user_id, items, total_amount, shipping_address))
    }
}

fn parse_item(raw: Value) -> Result<OrderItem, ApiError> {
    let item: OrderItemRequest = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation(format!("Invalid order item: {e}")))?;
    let (Some(product_id), Some(name), Some(quantity), Some(price)) = (
        non_blank(item.product_id),
        non_blank(item.name),
        item.quantity,
        item.price,
    ) else {
        return Err(ApiError::validation(
            "Each item requires productId, name, quantity and price",
        ));
    };
    let quantity = u32::try_from(quantity)
        .ok()
        .filter(|&q| q >= 1)
        .ok_or_else(|| ApiError::validation("Item quantity must be at least 1"))?;
    Ok(OrderItem {
        product_id,
        name,
        quantity,
        price,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub message: &'static str,
    pub order: Order,
}

fn envelope(message: &'static str, order: Order) -> Json<OrderEnvelope> {
    Json(OrderEnvelope { message, order })
}

async fn create_order<S: OrderStore>(
    State(store): State<S>,
    ValidJson(body): ValidJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderEnvelope>), ApiError> {
    let order = body.into_order()?;
    store
        .insert_order(&order)
        .await
        .map_err(|e| ApiError::internal("Error creating order", e))?;
    info!(order_id = %order.id, user_id = %order.user_id, "order created");
    Ok((StatusCode::CREATED, envelope("Order created successfully", order)))
}

async fn list_orders<S: OrderStore>(State(store): State<S>) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = store
        .list_orders()
        .await
        .map_err(|e| ApiError::internal("Error retrieving orders", e))?;
    Ok(Json(orders))
}

/// An empty result is a 404; the service cannot tell an unknown user from
/// one without orders.
async fn list_orders_by_user<S: OrderStore>(
    State(store): State<S>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = store
        .list_orders_by_user(&user_id)
        .await
        .map_err(|e| ApiError::internal("Error retrieving orders", e))?;
    if orders.is_empty() {
        return Err(ApiError::not_found("No orders found for this user"));
    }
    Ok(Json(orders))
}

async fn get_order<S: OrderStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_id(&id, ORDER_NOT_FOUND)?;
    store
        .get_order(id)
        .await
        .map_err(|e| ApiError::internal("Error retrieving order", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))
}

async fn update_status<S: OrderStore>(
    State(store): State<S>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateStatusRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let status = non_blank(body.status)
        .ok_or_else(|| ApiError::validation("Status is required"))?
        .parse::<OrderStatus>()
        .map_err(|_| ApiError::validation("Invalid status value"))?;
    let id = parse_id(&id, ORDER_NOT_FOUND)?;

    let order = store
        .set_order_status(id, status)
        .await
        .map_err(|e| ApiError::internal("Error updating order status", e))?
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))?;
    info!(order_id = %order.id, %status, "order status updated");
    Ok(envelope("Order status updated successfully", order))
}

async fn update_payment_status<S: OrderStore>(
    State(store): State<S>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdatePaymentRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let payment_status = non_blank(body.payment_status)
        .ok_or_else(|| ApiError::validation("Payment status is required"))?
        .parse::<PaymentStatus>()
        .map_err(|_| ApiError::validation("Invalid payment status value"))?;
    let id = parse_id(&id, ORDER_NOT_FOUND)?;

    let order = store
        .set_payment_status(id, payment_status)
        .await
        .map_err(|e| ApiError::internal("Error updating payment status", e))?
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))?;
    info!(order_id = %order.id, %payment_status, "payment status updated");
    Ok(envelope("Payment status updated successfully", order))
}

// Read, check, write: not guarded against a concurrent status change.
async fn cancel_order<S: OrderStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let id = parse_id(&id, ORDER_NOT_FOUND)?;
    let current = store
        .get_order(id)
        .await
        .map_err(|e| ApiError::internal("Error cancelling order", e))?
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))?;

    if !current.status.can_cancel() {
        return Err(ApiError::conflict(
            "Cannot cancel an order that has been shipped or delivered",
        ));
    }

    let order = store
        .set_order_status(id, OrderStatus::Cancelled)
        .await
        .map_err(|e| ApiError::internal("Error cancelling order", e))?
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))?;
    info!(order_id = %order.id, "order cancelled");
    Ok(envelope("Order cancelled successfully", order))
}
