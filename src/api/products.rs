//! Product service handlers, mounted at `/api/products`. Plain CRUD.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use super::{MessageResponse, ValidJson, non_blank, parse_id};
use crate::error::ApiError;
use crate::persistence::ProductStore;
use crate::types::product::{Product, ProductFields};

const PRODUCT_NOT_FOUND: &str = "Product not found";

pub fn routes<S: ProductStore>() -> Router<S> {
    Router::new()
        .route(
            "/api/products",
            get(list_products::<S>).post(create_product::<S>),
        )
        .route(
            "/api/products/{id}",
            get(get_product::<S>)
                .put(update_product::<S>)
                .delete(delete_product::<S>),
        )
}

/// Body for create and update. Create needs every field; update merges
/// whatever is sent over the stored product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl ProductRequest {
    /// Presence check only: a zero price or zero stock is a valid value.
    pub fn into_fields(self) -> Result<ProductFields, ApiError> {
        let (Some(name), Some(description), Some(price), Some(stock)) = (
            non_blank(self.name),
            non_blank(self.description),
            self.price,
            self.stock,
        ) else {
            return Err(ApiError::validation("All fields are required"));
        };
        if price < 0.0 || stock < 0 {
            return Err(ApiError::validation("Price and stock must not be negative"));
        }
        Ok(ProductFields {
            name,
            description,
            price,
            stock,
        })
    }

    /// Fields of `current` overlaid with the ones present in the body.
    pub fn merge_into(self, current: Product) -> Result<ProductFields, ApiError> {
        if self.price.is_some_and(|p| p < 0.0) || self.stock.is_some_and(|s| s < 0) {
            return Err(ApiError::validation("Price and stock must not be negative"));
        }
        Ok(ProductFields {
            name: self.name.unwrap_or(current.name),
            description: self.description.unwrap_or(current.description),
            price: self.price.unwrap_or(current.price),
            stock: self.stock.unwrap_or(current.stock),
        })
    }
}

async fn create_product<S: ProductStore>(
    State(store): State<S>,
    ValidJson(body): ValidJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = Product::new(body.into_fields()?);
    store
        .insert_product(&product)
        .await
        .map_err(|e| ApiError::internal("Error creating product", e))?;
    info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products<S: ProductStore>(
    State(store): State<S>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = store
        .list_products()
        .await
        .map_err(|e| ApiError::internal("Error retrieving products", e))?;
    Ok(Json(products))
}

async fn get_product<S: ProductStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id, PRODUCT_NOT_FOUND)?;
    store
        .get_product(id)
        .await
        .map_err(|e| ApiError::internal("Error retrieving product", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))
}

async fn update_product<S: ProductStore>(
    State(store): State<S>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id, PRODUCT_NOT_FOUND)?;
    let current = store
        .get_product(id)
        .await
        .map_err(|e| ApiError::internal("Error updating product", e))?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
    let fields = body.merge_into(current)?;
    let product = store
        .replace_product(id, fields)
        .await
        .map_err(|e| ApiError::internal("Error updating product", e))?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
    info!(product_id = %product.id, "product updated");
    Ok(Json(product))
}

async fn delete_product<S: ProductStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, PRODUCT_NOT_FOUND)?;
    let removed = store
        .delete_product(id)
        .await
        .map_err(|e| ApiError::internal("Error deleting product", e))?;
    if !removed {
        return Err(ApiError::not_found(PRODUCT_NOT_FOUND));
    }
    info!(product_id = %id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}
