//! `POST /login`: resolve a username and issue a bearer token.

use axum::extract::State;
use ember_core::{store::EmergencyStore, validate};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Claims, error::ApiError, extract::Json};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token: String,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: EmergencyStore,
{
  let username = body.username.trim().to_owned();
  if !validate::is_valid_username(&username) {
    tracing::warn!(%username, "login with malformed username");
    return Err(ApiError::Unauthorized("unknown username".into()));
  }

  let identity = state
    .store
    .find_identity_by_username(username.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      tracing::warn!(%username, "login for unknown username");
      ApiError::Unauthorized("unknown username".into())
    })?;

  let token = state.tokens.issue(&Claims::from(&identity))?;
  tracing::info!(%username, pidm = %identity.pidm, "issued token");
  Ok(Json(LoginResponse { token }))
}
