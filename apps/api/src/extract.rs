//! Request extractors whose rejections use the `AppError` envelope instead of
//! axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// `axum::Json` that rejects with `AppError::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// `axum::extract::Path` that rejects with `AppError::Validation`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);
