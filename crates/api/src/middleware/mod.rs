//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and echoed back)
//! 4. Rate limiting on login and registration only
//! 5. Bearer token gate on protected routes only

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CurrentUser, RequireAuth, require_bearer_token};
pub use rate_limit::{auth_rate_limiter, rate_limit_envelope};
pub use request_id::request_id_middleware;
