//! Business logic services.
//!
//! Catalog and cart operations are thin enough to live in their handlers on
//! top of the repositories; only authentication needs a service layer.

pub mod auth;
