//! The `x-viewer-id` extractor.
//!
//! Stride trusts an upstream gateway to authenticate the caller and forward
//! their account id. Every request that reads or writes on someone's behalf
//! must carry it.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const VIEWER_HEADER: &str = "x-viewer-id";

/// The account the request acts as.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Uuid);

impl<St> FromRequestParts<St> for Viewer
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(VIEWER_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .ok_or(ApiError::MissingViewer)?;

    Uuid::parse_str(raw)
      .map(Viewer)
      .map_err(|_| ApiError::BadRequest(format!("{VIEWER_HEADER} is not a uuid: {raw:?}")))
  }
}
