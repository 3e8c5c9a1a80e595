//! Bearer token gate and the extractor handlers use to read its result.
//!
//! [`require_bearer_token`] is applied with `route_layer` to protected
//! routers only. It verifies the `Authorization: Bearer` token and stores a
//! [`CurrentUser`] in the request extensions; [`RequireAuth`] reads it back.
//! A request that fails the gate never reaches its handler.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use ecommerce_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Identity established by the bearer token gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

/// Middleware that rejects requests without a valid bearer token.
///
/// Every failure produces the same 401 envelope; the reason is only logged.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is missing, uses another
/// scheme, is empty, or the token fails verification.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("missing bearer token");
        return Err(AppError::Unauthorized);
    };

    let user_id = state.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AppError::Unauthorized
    })?;

    Span::current().record("user_id", user_id.as_i32());
    set_sentry_user(&user_id);

    request
        .extensions_mut()
        .insert(CurrentUser { id: user_id });
    Ok(next.run(request).await)
}

/// The token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for handlers behind the bearer token gate.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}
