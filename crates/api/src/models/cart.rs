//! Cart line type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ecommerce_core::{CartItemId, ProductId, UserId};

/// One product in a user's cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Always positive.
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
