//! Argon2id password hashing.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

use crate::config::PasswordHashConfig;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The configured cost parameters are out of range.
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(argon2::Error),

    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
}

/// Plaintext behind [`PasswordHasher::dummy_hash`]. Never a real password.
const DUMMY_PASSWORD: &str = "dummy password for unknown accounts";

/// Salted Argon2id hasher with configured cost parameters.
///
/// Hashes are self-describing PHC strings, so verification uses the
/// parameters stored in the hash rather than the current configuration.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Build a hasher from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the costs.
    /// Returns `PasswordError::Hash` if the dummy hash cannot be computed.
    pub fn new(config: &PasswordHashConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(PasswordError::InvalidParams)?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;

        Ok(Self {
            argon2,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// A hash with the configured costs that matches no submitted password.
    ///
    /// Verifying against it when an account does not exist keeps a failed
    /// login as slow as a wrong password.
    #[must_use]
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Hash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, password)
    }

    /// Check a password against a stored hash.
    ///
    /// Returns `Ok(false)` on a mismatch.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::MalformedHash` if `hash` cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e)),
        }
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
