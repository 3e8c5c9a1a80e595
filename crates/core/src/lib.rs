//! E-commerce core - shared domain types.
//!
//! This crate provides the types used across every component of the backend:
//! - `api` - The HTTP server (auth, catalog, cart)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres`
//! feature so the types can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and usernames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
