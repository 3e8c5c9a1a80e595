//! Catalog route handlers.

use axum::extract::State;

use ecommerce_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::product::ProductFilterQuery;
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;

const NOT_FOUND: &str = "Product not found";

/// Create a product.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(payload): ApiJson<NewProduct>,
) -> Result<ApiResponse<Product>> {
    let payload = payload.validate()?;
    let product = ProductRepository::new(state.pool()).create(&payload).await?;
    tracing::info!(product_id = %product.id, user_id = %current.id, "product created");

    Ok(ApiResponse::ok("Product created successfully", product))
}

/// All live products.
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::ok("Products retrieved successfully", products))
}

/// One product by ID.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    Ok(ApiResponse::ok("Product retrieved successfully", product))
}

/// Apply a partial update.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(payload): ApiJson<ProductUpdate>,
) -> Result<ApiResponse<Product>> {
    let payload = payload.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &payload)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    Ok(ApiResponse::ok("Product updated successfully", product))
}

/// Soft delete a product.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiResponse<()>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    tracing::info!(product_id = %id, user_id = %current.id, "product deleted");

    Ok(ApiResponse::empty("Product deleted successfully"))
}

/// Products matching the query string predicates.
pub async fn filter(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiQuery(query): ApiQuery<ProductFilterQuery>,
) -> Result<ApiResponse<Vec<Product>>> {
    let filter = ProductFilter::try_from(query)?;
    let products = ProductRepository::new(state.pool()).filter(&filter).await?;

    Ok(ApiResponse::ok(
        "Filtered products retrieved successfully",
        products,
    ))
}
