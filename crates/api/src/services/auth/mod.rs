//! Authentication service.
//!
//! Password registration and login, bearer token issuance, and lookup of the
//! user behind a verified token.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{PasswordError, PasswordHasher};
pub use token::{IssuedToken, TokenError, TokenIssuer};

use sqlx::PgPool;

use ecommerce_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    passwords: &'a PasswordHasher,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        passwords: &'a PasswordHasher,
        tokens: &'a TokenIssuer,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            passwords,
            tokens,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` if the input is rejected.
    /// Returns `AuthError::UserAlreadyExists` if the email or username is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = self.hash_blocking(password.to_owned()).await?;

        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(reason) => AuthError::UserAlreadyExists(reason),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown, badly
    /// formed, or the password does not match.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, IssuedToken), AuthError> {
        let record = match Email::parse(email) {
            Ok(email) => self.users.get_password_hash(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = record else {
            self.verify_blocking(password.to_owned(), self.passwords.dummy_hash().to_owned())
                .await?;
            tracing::debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_blocking(password.to_owned(), password_hash)
            .await?
        {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        Ok((user, token))
    }

    /// Issue an already-expired token for the caller to store in place of
    /// their current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn logout(&self, user_id: UserId) -> Result<IssuedToken, AuthError> {
        Ok(self.tokens.issue_expired(user_id)?)
    }

    /// The live user behind a verified token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists.
    pub async fn current_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.passwords.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hash)
    }

    async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.passwords.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await??;
        Ok(matches)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
