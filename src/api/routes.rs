use axum::{Router, routing::get};
use tower_http::normalize_path::NormalizePath;

use super::{auth, orders, products};
use crate::persistence::{OrderStore, ProductStore, UserStore};

pub async fn health() -> &'static str {
    "healthy"
}

/// Routing ignores a trailing slash: `/api/products/` is `/api/products`.
fn lenient(inner: Router) -> Router {
    Router::new().fallback_service(NormalizePath::trim_trailing_slash(inner))
}

pub fn order_router<S: OrderStore>(store: S) -> Router {
    lenient(
        orders::routes::<S>()
            .route("/health", get(health))
            .with_state(store),
    )
}

pub fn product_router<S: ProductStore>(store: S) -> Router {
    lenient(
        products::routes::<S>()
            .route("/health", get(health))
            .with_state(store),
    )
}

pub fn user_router<S: UserStore>(store: S) -> Router {
    lenient(
        auth::routes::<S>()
            .route("/health", get(health))
            .with_state(store),
    )
}
