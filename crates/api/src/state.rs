//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::auth::{AuthService, PasswordError, PasswordHasher, TokenIssuer};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("password hasher: {0}")]
    PasswordHasher(#[from] PasswordError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    passwords: PasswordHasher,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured Argon2 parameters are invalid.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let passwords = PasswordHasher::new(&config.auth.password_hash)?;
        let tokens = TokenIssuer::new(&config.auth);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                passwords,
                tokens,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Authentication service borrowing this state's pool, hasher, and
    /// token issuer.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.pool, &self.inner.passwords, &self.inner.tokens)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl AppState {
    /// State over a pool that never connects until a query runs, with cheap
    /// hashing parameters.
    pub(crate) fn for_tests() -> Self {
        use chrono::TimeDelta;
        use secrecy::SecretString;
        use sqlx::postgres::PgPoolOptions;

        use crate::config::{AuthConfig, LogFormat, PasswordHashConfig};

        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/ecommerce_test".to_owned()),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            db_max_connections: 1,
            auth: AuthConfig {
                jwt_secret: SecretString::from("q8Zr2LmX0vTnB7wKpE4sYdJ9uHcF1gRa".to_owned()),
                token_ttl: TimeDelta::hours(72),
                password_hash: PasswordHashConfig {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                },
            },
            trust_proxy_headers: false,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://localhost/ecommerce_test")
            .unwrap();

        Self::new(config, pool).unwrap()
    }
}
