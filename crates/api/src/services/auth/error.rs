//! Authentication error types.

use thiserror::Error;

use ecommerce_core::{EmailError, UsernameError};

use super::password::PasswordError;
use super::token::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password too short.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email or username is already registered.
    #[error("{0}")]
    UserAlreadyExists(String),

    /// Token subject no longer maps to a live user.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing error.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing error.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The blocking hash task panicked or was cancelled.
    #[error("password hashing task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}
