//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("missing or empty `x-viewer-id` header")]
  MissingViewer,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<stride_core::Error> for ApiError {
  fn from(e: stride_core::Error) -> Self {
    use stride_core::Error;
    match e {
      Error::AccountNotFound(_) | Error::FollowNotFound(_) | Error::PostNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      Error::Unauthorized { .. } => Self::Forbidden(e.to_string()),
      Error::InvalidOperation(m) => Self::BadRequest(m),
      Error::Conflict(m) => Self::Conflict(m),
      Error::StoreUnavailable(inner) => Self::Unavailable(inner),
      Error::UnknownDiscriminant { .. } | Error::Serialization(_) => Self::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::MissingViewer => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::warn!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
