//! Reference-data listings. Public; no token required.

use axum::{Json, extract::State};
use ember_core::{
  reference::{Nation, Relation, State as UsState},
  store::EmergencyStore,
};

use crate::{AppState, error::ApiError};

/// `GET /relations`
pub async fn relations<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Relation>>, ApiError>
where
  S: EmergencyStore,
{
  Ok(Json(state.store.list_relations().await.map_err(ApiError::store)?))
}

/// `GET /nations`
pub async fn nations<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Nation>>, ApiError>
where
  S: EmergencyStore,
{
  Ok(Json(state.store.list_nations().await.map_err(ApiError::store)?))
}

/// `GET /states`
pub async fn states<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<UsState>>, ApiError>
where
  S: EmergencyStore,
{
  Ok(Json(state.store.list_states().await.map_err(ApiError::store)?))
}
