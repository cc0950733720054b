//! `GET`/`POST /notifications`: emergency notification channels.

use axum::{extract::State, response::Response};
use ember_core::{
  profile::{Indicator, NotificationForm, Profile},
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

/// The notification half of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
  pub external_email:  Option<String>,
  /// Read-only; copied from the directory.
  pub campus_email:    Option<String>,
  pub primary_phone:   Option<String>,
  pub alternate_phone: Option<String>,
  pub sms_status:      Option<Indicator>,
  pub sms_device:      Option<String>,
}

impl From<Profile> for NotificationView {
  fn from(p: Profile) -> Self {
    Self {
      external_email:  p.external_email,
      campus_email:    p.campus_email,
      primary_phone:   p.primary_phone,
      alternate_phone: p.alternate_phone,
      sms_status:      p.sms_status,
      sms_device:      p.sms_device,
    }
  }
}

/// `GET /notifications`. 204 until the caller has a profile.
pub async fn get<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
) -> Result<Response, ApiError>
where
  S: EmergencyStore,
{
  let profile = state
    .store
    .get_profile(claims.pidm)
    .await
    .map_err(ApiError::store)?;
  Ok(json_or_no_content(profile.map(NotificationView::from)))
}

/// `POST /notifications`. Replaces every channel at once.
pub async fn set<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  Json(form): Json<NotificationForm>,
) -> Result<Json<NotificationView>, ApiError>
where
  S: EmergencyStore,
{
  let settings = validate::notifications(&form)?;
  let profile = state
    .store
    .set_notifications(claims.pidm, settings)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(pidm = %claims.pidm, sms_status = ?profile.sms_status, "updated notifications");
  Ok(Json(profile.into()))
}
