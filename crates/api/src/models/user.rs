//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ecommerce_core::{Email, UserId, Username};

/// A registered shopper.
///
/// This is the only user shape that leaves the repository layer; the
/// password hash stays inside [`crate::db::users`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
