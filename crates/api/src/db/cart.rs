//! Cart repository. Every query is scoped to one user.

use sqlx::PgPool;

use ecommerce_core::{ProductId, UserId};

use super::{RepositoryError, is_out_of_range};
use crate::models::CartItem;

/// Reason returned when a merge would push a line past `i32::MAX`.
pub const QUANTITY_OVERFLOW: &str = "cart quantity cannot exceed 2147483647";

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of a product to the user's cart.
    ///
    /// A second add of the same product increases the existing line rather
    /// than creating a new one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// has been deleted.
    /// Returns `RepositoryError::OutOfRange` if the merged quantity would
    /// overflow the column.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart (user_id, product_id, quantity)
             SELECT $1, p.id, $3
             FROM products p
             WHERE p.id = $2 AND p.deleted_at IS NULL
             ON CONFLICT (user_id, product_id) WHERE deleted_at IS NULL
             DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity,
                           updated_at = NOW()
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                return RepositoryError::OutOfRange(QUANTITY_OVERFLOW);
            }
            RepositoryError::Database(e)
        })?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set the quantity of the user's line for a product.
    ///
    /// Returns `None` if the user has no live line for it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "UPDATE cart
             SET quantity = $3, updated_at = NOW()
             WHERE user_id = $1 AND product_id = $2 AND deleted_at IS NULL
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// Soft delete the user's line for a product.
    ///
    /// Returns `false` if the user has no live line for it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart
             SET deleted_at = NOW(), updated_at = NOW()
             WHERE user_id = $1 AND product_id = $2 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's live cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS}
             FROM cart
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }
}
