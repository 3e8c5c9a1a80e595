//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server errors are captured to
//! Sentry and logged before a generic envelope is sent; client errors carry
//! their reason in the envelope's `error` field.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::{RepositoryError, users};
use crate::models::ProductValidationError;
use crate::response::ApiResponse;
use crate::services::auth::AuthError;

/// The `error` text of every bearer token rejection.
pub const UNAUTHORIZED_DETAIL: &str = "missing or invalid bearer token";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Request body, path, or query failed validation.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Missing or rejected bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found. Carries the envelope message.
    #[error("{0}")]
    NotFound(&'static str),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::OutOfRange(_)) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists(_) => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::WeakPassword { .. } => StatusCode::BAD_REQUEST,
                AuthError::Password(_)
                | AuthError::Token(_)
                | AuthError::Repository(_)
                | AuthError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Envelope `(message, error)`. Server errors get a generic pair so
    /// storage details never leak.
    fn envelope(&self) -> (&'static str, String) {
        const INTERNAL: (&str, &str) = ("Internal server error", "internal server error");

        match self {
            Self::Database(RepositoryError::NotFound) => ("Not found", "not found".to_owned()),
            Self::Database(RepositoryError::Conflict(reason)) => ("Conflict", reason.clone()),
            Self::Database(RepositoryError::OutOfRange(reason)) => {
                ("Invalid input", (*reason).to_owned())
            }
            Self::Database(_) => (INTERNAL.0, INTERNAL.1.to_owned()),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    ("Invalid email or password", "invalid credentials".to_owned())
                }
                AuthError::UserNotFound => ("Unauthorized", UNAUTHORIZED_DETAIL.to_owned()),
                AuthError::UserAlreadyExists(reason) => {
                    let message = if reason == users::USERNAME_TAKEN {
                        "Username already exists"
                    } else {
                        "Email already exists"
                    };
                    (message, reason.clone())
                }
                AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::WeakPassword { .. } => ("Invalid input", err.to_string()),
                AuthError::Password(_)
                | AuthError::Token(_)
                | AuthError::Repository(_)
                | AuthError::Blocking(_) => (INTERNAL.0, INTERNAL.1.to_owned()),
            },
            Self::Validation(detail) => ("Invalid input", detail.clone()),
            Self::Unauthorized => ("Unauthorized", UNAUTHORIZED_DETAIL.to_owned()),
            Self::NotFound(message) => (*message, "not found".to_owned()),
            Self::RateLimited => ("Too many requests", "rate limit exceeded".to_owned()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (message, error) = self.envelope();
        (status, ApiResponse::failure(message, error)).into_response()
    }
}

impl From<ProductValidationError> for AppError {
    fn from(err: ProductValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use ecommerce_core::EmailError;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("Product not found")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists(
                users::EMAIL_TAKEN.to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidEmail(EmailError::Empty))),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Unauthorized",
                "success": false,
                "error": "missing or invalid bearer token"
            })
        );
    }

    #[tokio::test]
    async fn test_server_errors_do_not_leak_details() {
        let (status, body) = render(AppError::Database(RepositoryError::Database(
            sqlx::Error::Protocol("relation \"products\" does not exist".to_string()),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
        assert!(!body.to_string().contains("relation"));
    }

    #[tokio::test]
    async fn test_conflict_message_names_the_field() {
        let (_, body) = render(AppError::Auth(AuthError::UserAlreadyExists(
            users::USERNAME_TAKEN.to_string(),
        )))
        .await;
        assert_eq!(body["message"], "Username already exists");

        let (_, body) = render(AppError::Auth(AuthError::UserAlreadyExists(
            users::EMAIL_TAKEN.to_string(),
        )))
        .await;
        assert_eq!(body["message"], "Email already exists");
    }

    #[tokio::test]
    async fn test_out_of_range_is_a_client_error() {
        let (status, body) = render(AppError::Database(RepositoryError::OutOfRange(
            crate::db::cart::QUANTITY_OVERFLOW,
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid input");
        assert_eq!(body["error"], "cart quantity cannot exceed 2147483647");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message() {
        let (status, body) = render(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
        assert_eq!(body["success"], false);
    }
}
