//! `GET`/`POST /evacuation-assistance`.

use axum::{extract::State, response::Response};
use ember_core::{
  profile::{EvacuationForm, Indicator},
  store::EmergencyStore,
  validate,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::Json,
  handlers::json_or_no_content,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvacuationView {
  pub evacuation_assistance: Indicator,
}

/// `GET /evacuation-assistance`. 204 until the flag has been set.
pub async fn get<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
) -> Result<Response, ApiError>
where
  S: EmergencyStore,
{
  let flag = state
    .store
    .get_profile(claims.pidm)
    .await
    .map_err(ApiError::store)?
    .and_then(|p| p.evacuation_assistance);
  Ok(json_or_no_content(
    flag.map(|evacuation_assistance| EvacuationView { evacuation_assistance }),
  ))
}

/// `POST /evacuation-assistance`
pub async fn set<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  Json(form): Json<EvacuationForm>,
) -> Result<Json<EvacuationView>, ApiError>
where
  S: EmergencyStore,
{
  let flag = validate::evacuation(&form)?;
  state
    .store
    .set_evacuation_assistance(claims.pidm, flag)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(pidm = %claims.pidm, %flag, "updated evacuation assistance");
  Ok(Json(EvacuationView { evacuation_assistance: flag }))
}
