//! Signed bearer tokens (HS256 JWT).
//!
//! Claims are `{sub, iat, exp}` where `sub` is the user ID. Verification
//! checks the signature first and then expiry with zero leeway.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ecommerce_core::UserId;

use crate::config::AuthConfig;

/// How far in the past a logout token's expiry is placed.
const EXPIRED_OFFSET: TimeDelta = TimeDelta::hours(1);

/// Why a token was not issued or not accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Tampered, signed with another key, or signed with another algorithm.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// Past its `exp`.
    #[error("token has expired")]
    Expired,

    /// Not a parseable token, or claims are missing or ill-typed.
    #[error("token is malformed")]
    Malformed,

    /// Encoding failed.
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// A freshly signed token and when it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens with a fixed secret and lifetime.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Issue a token for `user_id` valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token for `user_id` that is already expired.
    ///
    /// Handed back on logout so clients can overwrite their stored token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_expired(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now() - self.ttl - EXPIRED_OFFSET)
    }

    pub(crate) fn issue_at(
        &self,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `SignatureInvalid`, `Expired`, or `Malformed` as appropriate.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::PasswordHashConfig;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: SecretString::from(secret.to_owned()),
            token_ttl: TimeDelta::hours(72),
            password_hash: PasswordHashConfig::default(),
        })
    }

    const SECRET: &str = "q8Zr2LmX0vTnB7wKpE4sYdJ9uHcF1gRa";

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer(SECRET);
        let issued = tokens.issue(UserId::new(42)).unwrap();

        assert_eq!(tokens.verify(&issued.token).unwrap(), UserId::new(42));
        assert!(issued.expires_at > Utc::now() + TimeDelta::hours(71));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = issuer(SECRET);
        let stale = Utc::now() - TimeDelta::hours(72) - TimeDelta::seconds(5);
        let issued = tokens.issue_at(UserId::new(1), stale).unwrap();

        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_logout_token_is_already_expired() {
        let tokens = issuer(SECRET);
        let issued = tokens.issue_expired(UserId::new(1)).unwrap();

        assert!(issued.expires_at < Utc::now());
        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let issued = issuer(SECRET).issue(UserId::new(1)).unwrap();
        let other = issuer("Zp3Kd8Wq1YvBn6Tx0Lr5Hs9Jc2Mf7Ge4");

        assert!(matches!(
            other.verify(&issued.token),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = issuer(SECRET);
        let mine = tokens.issue(UserId::new(1)).unwrap().token;
        let theirs = tokens.issue(UserId::new(2)).unwrap().token;

        // Splice user 2's claims onto user 1's signature.
        let mine: Vec<&str> = mine.split('.').collect();
        let theirs: Vec<&str> = theirs.split('.').collect();
        let forged = format!("{}.{}.{}", mine[0], theirs[1], mine[2]);

        assert!(matches!(
            tokens.verify(&forged),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let tokens = issuer(SECRET);
        let now = Utc::now();
        let claims = Claims {
            sub: "1".to_string(),
            iat: now.timestamp(),
            exp: (now + TimeDelta::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            tokens.verify(&token),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = issuer(SECRET);
        assert!(matches!(tokens.verify(""), Err(TokenError::Malformed)));
        assert!(matches!(
            tokens.verify("invalid.token.here"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_non_numeric_subject_is_malformed() {
        let tokens = issuer(SECRET);
        let now = Utc::now();
        let claims = Claims {
            sub: "alice".to_string(),
            iat: now.timestamp(),
            exp: (now + TimeDelta::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Malformed)));
    }
}
