//! Extractors whose rejections use the JSON envelope.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies. These
//! wrappers route the rejection through [`AppError`] so malformed bodies,
//! non-numeric ids, and bad query strings all produce a 400 envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
