//! The JSON envelope every endpoint responds with.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"message", "success", "data"?, "error"?}`.
///
/// Successful responses carry `data`; failures carry `error`. Failures are
/// built by [`crate::error::AppError`], which also picks the status code.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A `200 OK` with `data`.
    pub const fn ok(message: &'static str, data: T) -> Self {
        Self {
            message,
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// A `200 OK` without `data`.
    pub const fn empty(message: &'static str) -> Self {
        Self {
            message,
            success: true,
            data: None,
            error: None,
        }
    }

    pub const fn failure(message: &'static str, error: String) -> Self {
        Self {
            message,
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_error() {
        let body = serde_json::to_value(ApiResponse::ok("Done", 7)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "Done", "success": true, "data": 7})
        );
    }

    #[test]
    fn test_empty_has_neither() {
        let body = serde_json::to_value(ApiResponse::empty("Gone")).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Gone", "success": true}));
    }

    #[test]
    fn test_failure_omits_data() {
        let body =
            serde_json::to_value(ApiResponse::failure("Nope", "bad".to_string())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "Nope", "success": false, "error": "bad"})
        );
    }
}
