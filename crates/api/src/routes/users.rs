//! Account route handlers: registration, login, logout, and profile.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecommerce_core::{Email, UserId, Username};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// The user as shown next to a fresh token.
#[derive(Debug, Serialize)]
pub struct TokenOwner {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: TokenOwner,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub token: String,
}

/// Create an account.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<UserProfile>> {
    let user = state
        .auth()
        .register(&form.username, &form.email, &form.password)
        .await?;

    Ok(ApiResponse::ok("User registered successfully", user.into()))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>> {
    let (user, issued) = state.auth().login(&form.email, &form.password).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::ok(
        "User logged in successfully",
        LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            user: TokenOwner {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        },
    ))
}

/// Hand back an already-expired token for the client to store.
///
/// The presented token is not revoked; it stays valid until its own expiry.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<ApiResponse<LogoutResponse>> {
    let issued = state.auth().logout(current.id)?;
    tracing::info!(user_id = %current.id, "user logged out");

    Ok(ApiResponse::ok(
        "User logged out successfully",
        LogoutResponse {
            token: issued.token,
        },
    ))
}

/// The authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<ApiResponse<UserProfile>> {
    let user = state.auth().current_user(current.id).await?;
    Ok(ApiResponse::ok("User retrieved successfully", user.into()))
}
