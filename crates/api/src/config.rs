//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `JWT_SECRET` - Bearer token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `TOKEN_TTL_HOURS` - Bearer token lifetime in hours (default: 72)
//! - `PASSWORD_HASH_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `PASSWORD_HASH_ITERATIONS` - Argon2 time cost (default: 2)
//! - `PASSWORD_HASH_PARALLELISM` - Argon2 lanes (default: 1)
//! - `TRUST_PROXY_HEADERS` - Key rate limits on `X-Forwarded-For` /
//!   `X-Real-IP` instead of the peer address (default: false)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::TimeDelta;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret_key",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Token and password hashing settings
    pub auth: AuthConfig,
    /// Take the client IP from proxy headers when rate limiting
    pub trust_proxy_headers: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for bearer tokens
    pub jwt_secret: SecretString,
    /// Lifetime of an issued token
    pub token_ttl: TimeDelta,
    /// Argon2 work factor
    pub password_hash: PasswordHashConfig,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    /// OWASP baseline for Argon2id: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let database_url = SecretString::from(env.required("DATABASE_URL")?);
        let host = env.parsed_or("HOST", "0.0.0.0".parse::<IpAddr>().ok())?;
        let port = env.parsed_or("PORT", Some(8080_u16))?;
        let db_max_connections = env.parsed_or("DB_MAX_CONNECTIONS", Some(10_u32))?;

        let jwt_secret = env.required("JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "JWT_SECRET")?;

        let ttl_hours: u32 = env.parsed_or("TOKEN_TTL_HOURS", Some(72))?;
        if ttl_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_TTL_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let defaults = PasswordHashConfig::default();
        let password_hash = PasswordHashConfig {
            memory_kib: env.parsed_or("PASSWORD_HASH_MEMORY_KIB", Some(defaults.memory_kib))?,
            iterations: env.parsed_or("PASSWORD_HASH_ITERATIONS", Some(defaults.iterations))?,
            parallelism: env.parsed_or("PASSWORD_HASH_PARALLELISM", Some(defaults.parallelism))?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            auth: AuthConfig {
                jwt_secret: SecretString::from(jwt_secret),
                token_ttl: TimeDelta::hours(i64::from(ttl_hours)),
                password_hash,
            },
            trust_proxy_headers: env.parsed_or("TRUST_PROXY_HEADERS", Some(false))?,
            log_format: env.parsed_or("LOG_FORMAT", Some(LogFormat::Text))?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value or `None`.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string())),
        }
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder, or low-entropy signing secrets.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let length = secret.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters (got {length})"),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

impl AuthConfig {
    /// Expose the signing key bytes.
    #[must_use]
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "q8Zr2LmX0vTnB7wKpE4sYdJ9uHcF1gRa";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", STRONG_SECRET),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.auth.token_ttl, TimeDelta::hours(72));
        assert_eq!(config.auth.password_hash, PasswordHashConfig::default());
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.trust_proxy_headers);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", STRONG_SECRET),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("TOKEN_TTL_HOURS", "1"),
            ("PASSWORD_HASH_MEMORY_KIB", "4096"),
            ("LOG_FORMAT", "JSON"),
            ("TRUST_PROXY_HEADERS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.auth.token_ttl, TimeDelta::hours(1));
        assert_eq!(config.auth.password_hash.memory_kib, 4096);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.trust_proxy_headers);
    }

    #[test]
    fn test_missing_required() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", STRONG_SECRET)])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "DATABASE_URL"));

        let err = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "JWT_SECRET"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", STRONG_SECRET),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PORT"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", STRONG_SECRET),
            ("TOKEN_TTL_HOURS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_jwt_secret_too_short() {
        let result = validate_jwt_secret("aB3$xY9!", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(..))));
    }

    #[test]
    fn test_jwt_secret_placeholder() {
        let result = validate_jwt_secret("your_secret_key_aB3$xY9!mK2@nL5#pQ7", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(..))));
    }

    #[test]
    fn test_jwt_secret_low_entropy() {
        let result = validate_jwt_secret(&"ab".repeat(20), "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(..))));
    }

    #[test]
    fn test_jwt_secret_valid() {
        assert!(validate_jwt_secret(STRONG_SECRET, "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://user:hunter2@db/shop"),
            ("JWT_SECRET", STRONG_SECRET),
        ]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains(STRONG_SECRET));
    }
}
