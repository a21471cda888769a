//! Data store layer: store traits, the PostgreSQL implementation (pool,
//! migrations, per-entity queries) and the in-memory implementation.

mod memory;
mod orders;
mod pool;
mod products;
mod store;
mod users;

pub use memory::MemoryStore;
pub use pool::{PgStore, connect_and_migrate};
pub use store::{OrderStore, ProductStore, StoreError, StoreResult, UserStore};
