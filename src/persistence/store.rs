//! Store interfaces, one per entity. Handlers are generic over these so the
//! same routes run against PostgreSQL or the in-memory store.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::types::order::{Order, OrderStatus, PaymentStatus};
use crate::types::product::{Product, ProductFields};
use crate::types::user::UserRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row that does not decode into a valid entity (e.g. unknown status).
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait OrderStore: Clone + Send + Sync + 'static {
    fn insert_order(&self, order: &Order) -> impl Future<Output = StoreResult<()>> + Send;

    /// All orders, newest first.
    fn list_orders(&self) -> impl Future<Output = StoreResult<Vec<Order>>> + Send;

    /// Orders placed by `user_id`, newest first.
    fn list_orders_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<Order>>> + Send;

    fn get_order(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Order>>> + Send;

    /// Set `status`, returning the updated order or `None` if absent.
    fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> impl Future<Output = StoreResult<Option<Order>>> + Send;

    fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> impl Future<Output = StoreResult<Option<Order>>> + Send;
}

pub trait ProductStore: Clone + Send + Sync + 'static {
    fn insert_product(&self, product: &Product) -> impl Future<Output = StoreResult<()>> + Send;

    fn list_products(&self) -> impl Future<Output = StoreResult<Vec<Product>>> + Send;

    fn get_product(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Product>>> + Send;

    /// Replace every editable field; `None` if the product does not exist.
    fn replace_product(
        &self,
        id: Uuid,
        fields: ProductFields,
    ) -> impl Future<Output = StoreResult<Option<Product>>> + Send;

    /// Returns whether a product was removed.
    fn delete_product(&self, id: Uuid) -> impl Future<Output = StoreResult<bool>> + Send;
}

pub trait UserStore: Clone + Send + Sync + 'static {
    fn insert_user(&self, user: &UserRecord) -> impl Future<Output = StoreResult<()>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<UserRecord>>> + Send;

    fn list_users(&self) -> impl Future<Output = StoreResult<Vec<UserRecord>>> + Send;

    fn get_user(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<UserRecord>>> + Send;

    /// Overwrite name, email and password hash; `None` if the user does not exist.
    fn replace_user(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = StoreResult<Option<UserRecord>>> + Send;

    fn delete_user(&self, id: Uuid) -> impl Future<Output = StoreResult<bool>> + Send;
}
