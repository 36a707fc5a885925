//! Body and query extractors whose rejections render as [`AppError`].
//!
//! axum's own `Json` and `Query` reject with a plain-text body. These
//! wrappers run the same extraction and hand failures to
//! `AppError::BadRequest`, so malformed input gets the usual
//! `{"error", "code"}` envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// URL query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
