//! Request extractors whose rejections are [`ApiError`]s, so malformed bodies
//! and query strings get the same `{"error": …}` shape as every other failure.

use axum::extract::{FromRequest, FromRequestParts, Query};

use crate::error::ApiError;

/// [`axum::Json`] with an [`ApiError`] rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// [`axum::extract::Query`] with an [`ApiError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
