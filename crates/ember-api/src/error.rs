//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"error": <reason>}`; validation failures add a
//! `"fields"` array with one entry per rejected field.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use ember_core::{store::StoreError, validate::ValidationErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or unusable bearer credential, or an unknown login.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("token error: {0}")]
  Token(#[from] ember_token::Error),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// Well-formed input the current state cannot accept (e.g. a priority
  /// outside the owner's list).
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),

  /// A body or path segment axum could not extract; keeps axum's status.
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error, keeping ordering and ownership failures distinct
  /// from infrastructure failures.
  pub fn store<E: StoreError>(err: E) -> Self {
    use ember_core::Error as Core;

    let client_error = match err.as_core() {
      Some(e @ Core::InvalidPriority { .. }) => Some(Self::Unprocessable(e.to_string())),
      Some(e @ Core::ContactNotFound(_)) => Some(Self::NotFound(e.to_string())),
      Some(e @ Core::Forbidden(_)) => Some(Self::Forbidden(e.to_string())),
      Some(Core::InvariantViolation(_)) | None => None,
    };
    if let Some(e) = client_error {
      return e;
    }
    tracing::error!(error = %err, "store failure");
    Self::Store(Box::new(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Token(ember_token::Error::Encoding(_)) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::Token(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Unprocessable(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Rejected { status, .. } => *status,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Rejected { status: rejection.status(), message: rejection.body_text() }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::Rejected { status: rejection.status(), message: rejection.body_text() }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      Self::Validation(errors) => json!({ "error": "validation failed", "fields": errors }),
      Self::Store(_) => json!({ "error": "internal error" }),
      other => json!({ "error": other.to_string() }),
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
