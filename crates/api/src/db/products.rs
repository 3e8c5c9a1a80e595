//! Product repository for catalog queries.

use sqlx::PgPool;

use ecommerce_core::ProductId;

use super::{RepositoryError, escape_like};
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, stock)
             VALUES ($1, $2, $3, $4)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// All live products, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE deleted_at IS NULL
             ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// A live product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply the present fields of `update` to a live product.
    ///
    /// Returns `None` if no live product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 stock = COALESCE($5, stock),
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(update.stock)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Soft delete a live product.
    ///
    /// Returns `false` if no live product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products
             SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Live products matching every predicate present in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE deleted_at IS NULL
                 AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
                 AND ($2::numeric IS NULL OR price >= $2)
                 AND ($3::numeric IS NULL OR price <= $3)
                 AND ($4::integer IS NULL OR stock >= $4)
                 AND ($5::integer IS NULL OR stock <= $5)
             ORDER BY id"
        ))
        .bind(filter.name.as_deref().map(escape_like))
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.min_stock)
        .bind(filter.max_stock)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}
