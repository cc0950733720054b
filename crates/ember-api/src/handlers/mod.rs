pub mod contacts;
pub mod evacuation;
pub mod login;
pub mod notifications;
pub mod reference;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// `204 No Content` when an authorised read finds nothing, `200` otherwise.
pub(super) fn json_or_no_content<T: Serialize>(value: Option<T>) -> Response {
  match value {
    Some(value) => Json(value).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  }
}
