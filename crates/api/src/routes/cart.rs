//! Cart route handlers. Every handler acts on the caller's own cart.

use axum::extract::State;
use serde::Deserialize;

use ecommerce_core::ProductId;

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::CartItem;
use crate::response::ApiResponse;
use crate::state::AppState;

const NOT_IN_CART: &str = "Item not found in cart";

/// Add-to-cart form.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Quantity change form.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

fn check_quantity(quantity: i32) -> Result<i32> {
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than zero".to_owned(),
        ));
    }
    Ok(quantity)
}

/// Add a product, merging into an existing line for it.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(form): ApiJson<AddItemRequest>,
) -> Result<ApiResponse<CartItem>> {
    let quantity = check_quantity(form.quantity)?;

    let item = CartRepository::new(state.pool())
        .add(current.id, form.product_id, quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found"),
            other => AppError::Database(other),
        })?;

    tracing::debug!(
        user_id = %current.id,
        product_id = %item.product_id,
        quantity = item.quantity,
        "cart line added"
    );
    Ok(ApiResponse::ok("Item added to cart successfully", item))
}

/// Set the quantity for a product already in the cart.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(form): ApiJson<UpdateItemRequest>,
) -> Result<ApiResponse<CartItem>> {
    let quantity = check_quantity(form.quantity)?;

    let item = CartRepository::new(state.pool())
        .update_quantity(current.id, product_id, quantity)
        .await?
        .ok_or(AppError::NotFound(NOT_IN_CART))?;

    Ok(ApiResponse::ok("Item updated in cart successfully", item))
}

/// Remove a product from the cart.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<ApiResponse<()>> {
    if !CartRepository::new(state.pool())
        .remove(current.id, product_id)
        .await?
    {
        return Err(AppError::NotFound(NOT_IN_CART));
    }

    Ok(ApiResponse::empty("Item removed from cart successfully"))
}

/// The caller's cart.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<ApiResponse<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list(current.id).await?;
    Ok(ApiResponse::ok("Cart retrieved successfully", items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity() {
        assert!(matches!(check_quantity(1), Ok(1)));
        assert!(matches!(check_quantity(0), Err(AppError::Validation(_))));
        assert!(matches!(check_quantity(-4), Err(AppError::Validation(_))));
    }
}
