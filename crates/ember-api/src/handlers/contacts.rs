//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Caller's contacts by priority; 204 if none |
//! | `POST`   | `/contacts` | Upsert; 201 created, 200 updated |
//! | `DELETE` | `/contacts/{surrogate_id}` | 204; 404 unknown, 403 not the caller's |

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ember_core::{
  contact::{ContactForm, RelationCode, SurrogateId, Upsert},
  store::EmergencyStore,
  validate::{self, ValidationErrors},
};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{Json, Path},
  handlers::json_or_no_content,
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
) -> Result<Response, ApiError>
where
  S: EmergencyStore,
{
  let contacts = state
    .store
    .list_contacts(claims.pidm)
    .await
    .map_err(ApiError::store)?;
  Ok(json_or_no_content((!contacts.is_empty()).then_some(contacts)))
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

/// `POST /contacts`. Body: a contact form; `surrogate_id` selects update.
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  Json(form): Json<ContactForm>,
) -> Result<Response, ApiError>
where
  S: EmergencyStore,
{
  let validated = validate::contact(&form);
  let unknown = unknown_references(&state, &form).await?;

  let input = match validated {
    Ok(input) if unknown.is_empty() => input,
    Ok(_) => return Err(unknown.into()),
    Err(mut errors) => {
      errors.extend(unknown);
      return Err(errors.into());
    }
  };

  let (contact, outcome) = state
    .store
    .upsert_contact(claims.pidm, input)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    pidm = %claims.pidm,
    surrogate_id = %contact.surrogate_id,
    priority = contact.priority,
    ?outcome,
    "saved contact"
  );
  let status = match outcome {
    Upsert::Created => StatusCode::CREATED,
    Upsert::Updated => StatusCode::OK,
  };
  Ok((status, Json(contact)).into_response())
}

/// Codes in `form` that are well-formed but absent from the reference
/// tables. Malformed relation codes are left to the field validator.
async fn unknown_references<S>(
  state: &AppState<S>,
  form: &ContactForm,
) -> Result<ValidationErrors, ApiError>
where
  S: EmergencyStore,
{
  let mut errors = ValidationErrors::default();

  if let Some(code) = non_empty(&form.relation)
    && code.parse::<RelationCode>().is_ok()
  {
    let found = state
      .store
      .find_relation(code.to_owned())
      .await
      .map_err(ApiError::store)?;
    if found.is_none() {
      errors.push("relation", format!("unknown relation code {code:?}"));
    }
  }

  if let Some(code) = non_empty(&form.state_code) {
    let found = state
      .store
      .find_state(code.to_owned())
      .await
      .map_err(ApiError::store)?;
    if found.is_none() {
      errors.push("state_code", format!("unknown state code {code:?}"));
    }
  }

  if let Some(code) = non_empty(&form.nation_code) {
    let found = state
      .store
      .find_nation(code.to_owned())
      .await
      .map_err(ApiError::store)?;
    if found.is_none() {
      errors.push("nation_code", format!("unknown nation code {code:?}"));
    }
  }

  Ok(errors)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{surrogate_id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  Path(surrogate_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: EmergencyStore,
{
  let id = SurrogateId(surrogate_id);
  state
    .store
    .delete_contact(claims.pidm, id)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(pidm = %claims.pidm, surrogate_id = %id, "deleted contact");
  Ok(StatusCode::NO_CONTENT)
}
