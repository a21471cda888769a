//! In-memory store used when no `DATABASE_URL` is configured, and by tests.
//! Rows are kept in insertion order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{OrderStore, ProductStore, StoreResult, UserStore};
use crate::types::order::{Order, OrderStatus, PaymentStatus};
use crate::types::product::{Product, ProductFields};
use crate::types::user::UserRecord;

pub type Shared<T> = Arc<RwLock<Vec<T>>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    orders: Shared<Order>,
    products: Shared<Product>,
    users: Shared<UserRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<'a>(orders: impl DoubleEndedIterator<Item = &'a Order>) -> Vec<Order> {
    let mut out: Vec<Order> = orders.rev().cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

async fn update_order<F>(store: &Shared<Order>, id: Uuid, apply: F) -> Option<Order>
where
    F: FnOnce(&mut Order),
{
    let mut guard = store.write().await;
    let order = guard.iter_mut().find(|o| o.id == id)?;
    apply(order);
    order.updated_at = Utc::now();
    Some(order.clone())
}

impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let guard = self.orders.read().await;
        Ok(newest_first(guard.iter()))
    }

    async fn list_orders_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let guard = self.orders.read().await;
        let matching: Vec<&Order> = guard.iter().filter(|o| o.user_id == user_id).collect();
        Ok(newest_first(matching.into_iter()))
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let guard = self.orders.read().await;
        Ok(guard.iter().find(|o| o.id == id).cloned())
    }

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
        Ok(update_order(&self.orders, id, |o| o.status = status).await)
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> StoreResult<Option<Order>> {
        Ok(update_order(&self.orders, id, |o| o.payment_status = payment_status).await)
    }
}

impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let guard = self.products.read().await;
        Ok(guard.iter().find(|p| p.id == id).cloned())
    }

    async fn replace_product(&self, id: Uuid, fields: ProductFields) -> StoreResult<Option<Product>> {
        let mut guard = self.products.write().await;
        let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = fields.name;
        product.description = fields.description;
        product.price = fields.price;
        product.stock = fields.stock;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let mut guard = self.products.write().await;
        let before = guard.len();
        guard.retain(|p| p.id != id);
        Ok(guard.len() != before)
    }
}

impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        self.users.write().await.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let guard = self.users.read().await;
        Ok(guard.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.users.read().await.clone())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let guard = self.users.read().await;
        Ok(guard.iter().find(|u| u.id == id).cloned())
    }

    async fn replace_user(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<UserRecord>> {
        let mut guard = self.users.write().await;
        let Some(user) = guard.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.name = name.to_string();
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut guard = self.users.write().await;
        let before = guard.len();
        guard.retain(|u| u.id != id);
        Ok(guard.len() != before)
    }
}
