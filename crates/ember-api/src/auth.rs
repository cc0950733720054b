//! Bearer-token extractor and the claims carried in an Ember token.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use ember_core::{
  identity::{Identity, Pidm},
  store::EmergencyStore,
};
use ember_token::TokenService;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// The claims issued at login. `exp` is added by the token service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub username:   String,
  pub email:      Option<String>,
  pub pidm:       Pidm,
}

impl From<&Identity> for Claims {
  fn from(identity: &Identity) -> Self {
    Self {
      first_name: identity.first_name.clone(),
      last_name:  identity.last_name.clone(),
      username:   identity.username.clone(),
      email:      identity.email.clone(),
      pidm:       identity.pidm,
    }
  }
}

/// Present in a handler means the request carried a valid token; holds the
/// caller's decoded claims.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Validate the `Authorization: Bearer` header and decode its claims.
pub fn verify_bearer(headers: &HeaderMap, tokens: &TokenService) -> Result<Claims, ApiError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

  tokens.validate(token).inspect_err(|e| {
    tracing::warn!(error = %e, "rejected bearer token");
  })?;
  Ok(ember_token::decode_claims_as(token)?)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: EmergencyStore,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.tokens).map(Authenticated)
  }
}
