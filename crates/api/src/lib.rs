//! E-commerce REST API library.
//!
//! Accounts with Argon2id password hashing and HS256 bearer tokens, a
//! soft-deleting product catalog with filtering, and a per-user cart, all
//! backed by `PostgreSQL`. The binary in `main.rs` wires this up with
//! configuration, logging, and Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
