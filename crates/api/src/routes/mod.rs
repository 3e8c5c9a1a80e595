//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness
//! GET    /health/ready               - Readiness (database)
//!
//! # Users
//! POST   /api/users/register         - Create an account (rate limited)
//! POST   /api/users/login            - Issue a bearer token (rate limited)
//! POST   /api/users/logout           - Issue an expired token (auth)
//! GET    /api/users/me               - Caller's profile (auth)
//!
//! # Products
//! GET    /api/products               - List
//! POST   /api/products               - Create (auth)
//! GET    /api/products/filter        - Filter by name, price, stock (auth)
//! GET    /api/products/{id}          - Show
//! DELETE /api/products/{id}          - Soft delete (auth)
//! PUT    /api/products/update/{id}   - Partial update (auth)
//!
//! # Cart (all auth)
//! GET    /api/cart                   - Caller's cart
//! POST   /api/cart                   - Add a product
//! PUT    /api/cart/{product_id}      - Set quantity
//! DELETE /api/cart/{product_id}      - Remove a product
//! ```
//!
//! Routes marked (auth) sit behind [`require_bearer_token`], applied with
//! `route_layer` so unmatched paths still fall through to the 404 envelope.

pub mod cart;
pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state, map_response},
    routing::{get, post, put},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    auth_rate_limiter, rate_limit_envelope, request_id_middleware, require_bearer_token,
};
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes(state: &AppState) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route_layer(auth_rate_limiter(state.config().trust_proxy_headers))
        .route_layer(map_response(rate_limit_envelope));

    let protected = Router::new()
        .route("/logout", post(users::logout))
        .route("/me", get(users::me))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token));

    credentials.merge(protected)
}

/// Create the product routes router.
pub fn product_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::show));

    let protected = Router::new()
        .route("/", post(products::create))
        .route("/filter", get(products::filter))
        .route("/{id}", axum::routing::delete(products::delete))
        .route("/update/{id}", put(products::update))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token));

    public.merge(protected)
}

/// Create the cart routes router.
pub fn cart_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{product_id}", put(cart::update).delete(cart::remove))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token))
}

/// Build the application router with tracing and request IDs.
///
/// Sentry layers are added by the binary so tests run without a hub.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/users", user_routes(&state))
        .nest("/api/products", product_routes(&state))
        .nest("/api/cart", cart_routes(&state))
        .fallback(not_found)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found")
}
