//! Field-level validation of client input.
//!
//! Every check produces either a value or a reason, and the reasons are
//! collected rather than short-circuited: a caller always learns about every
//! bad field in one response. Validation runs before any store mutation, so a
//! rejected request never reaches the priority renumbering.

use std::fmt;

use serde::Serialize;

use crate::{
  contact::{Address, ContactForm, ContactName, NewContact, Phone, RelationCode},
  profile::{EvacuationForm, Indicator, NotificationForm, NotificationSettings},
};

const NAME_MAX: usize = 240;
const STREET_MAX: usize = 300;
const CITY_MAX: usize = 200;
const ZIP_MAX: usize = 120;
const EMAIL_MAX: usize = 512;

// ─── Primitive rules ─────────────────────────────────────────────────────────

/// Ten ASCII digits, not starting with 0 or 1, not ending in `11`.
pub fn is_valid_phone(phone: &str) -> bool {
  let bytes = phone.as_bytes();
  bytes.len() == 10
    && bytes.iter().all(u8::is_ascii_digit)
    && !matches!(bytes[0], b'0' | b'1')
    && !bytes.ends_with(b"11")
}

/// Exactly one `@`, and exactly one `.` after it.
pub fn is_valid_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((_, domain)) => !domain.contains('@') && domain.matches('.').count() == 1,
    None => false,
  }
}

/// At least six characters, each alphanumeric or `_`.
pub fn is_valid_username(username: &str) -> bool {
  username.chars().count() >= 6
    && username.chars().all(|c| c.is_alphanumeric() || c == '_')
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:  &'static str,
  pub reason: String,
}

/// Every field that failed validation, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn push(&mut self, field: &'static str, reason: impl Into<String>) {
    self.0.push(FieldError { field, reason: reason.into() });
  }

  pub fn extend(&mut self, other: impl IntoIterator<Item = FieldError>) {
    self.0.extend(other);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn fields(&self) -> &[FieldError] { &self.0 }

  /// `Ok(value)` if nothing was recorded, otherwise every recorded error.
  pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
    if self.0.is_empty() { Ok(value()) } else { Err(self) }
  }
}

impl From<Vec<FieldError>> for ValidationErrors {
  fn from(errors: Vec<FieldError>) -> Self { Self(errors) }
}

impl IntoIterator for ValidationErrors {
  type Item = FieldError;
  type IntoIter = std::vec::IntoIter<FieldError>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.reason)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// Trimmed, with empty and whitespace-only strings treated as absent.
fn present(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

impl ValidationErrors {
  fn required(
    &mut self,
    field: &'static str,
    value: &Option<String>,
    max: usize,
  ) -> Option<String> {
    match present(value) {
      None => {
        self.push(field, "is required");
        None
      }
      Some(v) => self.bounded(field, v, max),
    }
  }

  fn optional(
    &mut self,
    field: &'static str,
    value: &Option<String>,
    max: usize,
  ) -> Option<String> {
    present(value).and_then(|v| self.bounded(field, v, max))
  }

  fn bounded(&mut self, field: &'static str, value: String, max: usize) -> Option<String> {
    if value.chars().count() > max {
      self.push(field, format!("must be at most {max} characters"));
      None
    } else {
      Some(value)
    }
  }

  fn phone(&mut self, field: &'static str, value: &Option<String>) -> Option<String> {
    let value = present(value)?;
    if is_valid_phone(&value) {
      Some(value)
    } else {
      self.push(field, "must be a 10-digit phone number");
      None
    }
  }

  fn indicator(&mut self, field: &'static str, value: &Option<String>) -> Option<Indicator> {
    match present(value).map(|v| v.parse::<Indicator>()) {
      Some(Ok(indicator)) => Some(indicator),
      Some(Err(e)) => {
        self.push(field, e.to_string());
        None
      }
      None => {
        self.push(field, "is required");
        None
      }
    }
  }
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// Validate a submitted contact.
///
/// Checks names, relation code, priority (≥ 1; the upper bound depends on
/// the owner's list and is enforced by the store), the all-or-nothing
/// address group, and the phone group.
pub fn contact(form: &ContactForm) -> Result<NewContact, ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let priority = match form.priority {
    Some(p) if p >= 1 => match u32::try_from(p) {
      Ok(p) => Some(p),
      Err(_) => {
        errors.push("priority", "is too large");
        None
      }
    },
    Some(_) => {
      errors.push("priority", "must be at least 1");
      None
    }
    None => {
      errors.push("priority", "is required");
      None
    }
  };

  let relation = match present(&form.relation) {
    Some(code) => match code.parse::<RelationCode>() {
      Ok(r) => Some(r),
      Err(_) => {
        errors.push("relation", format!("unknown relation code {code:?}"));
        None
      }
    },
    None => None,
  };

  let first_name = errors.required("first_name", &form.first_name, NAME_MAX);
  let last_name = errors.required("last_name", &form.last_name, NAME_MAX);
  let middle_initial = errors.optional("middle_initial", &form.middle_initial, NAME_MAX);

  let address = address(form, &mut errors);
  let phone = phone(form, &mut errors);

  errors.finish(|| NewContact {
    surrogate_id: form.surrogate_id,
    // All three are `Some` whenever no error was recorded.
    priority: priority.unwrap_or_default(),
    relation,
    name: ContactName {
      first_name: first_name.unwrap_or_default(),
      last_name: last_name.unwrap_or_default(),
      middle_initial,
    },
    address: address.flatten(),
    phone: phone.flatten(),
  })
}

/// `Some(None)` for an absent address, `Some(Some(_))` for a complete one,
/// `None` when something was recorded in `errors`.
fn address(form: &ContactForm, errors: &mut ValidationErrors) -> Option<Option<Address>> {
  let before = errors.fields().len();

  let street_line1 = errors.optional("street_line1", &form.street_line1, STREET_MAX);
  let street_line2 = errors.optional("street_line2", &form.street_line2, STREET_MAX);
  let street_line3 = errors.optional("street_line3", &form.street_line3, STREET_MAX);
  let city = errors.optional("city", &form.city, CITY_MAX);
  let state_code = present(&form.state_code);
  let zip = errors.optional("zip", &form.zip, ZIP_MAX);
  let nation_code = present(&form.nation_code);

  let any = [
    &street_line1,
    &street_line2,
    &street_line3,
    &city,
    &state_code,
    &zip,
    &nation_code,
  ]
  .iter()
  .any(|f| f.is_some());

  if !any {
    return (errors.fields().len() == before).then_some(None);
  }

  if street_line1.is_none() && present(&form.street_line1).is_none() {
    errors.push("street_line1", "is required when an address is given");
  }
  if city.is_none() && present(&form.city).is_none() {
    errors.push("city", "is required when an address is given");
  }
  let has_region = state_code.is_some() && zip.is_some();
  if nation_code.is_none() && !has_region {
    errors.push("address", "a nation, or a state and zip, is required");
  }

  if errors.fields().len() != before {
    return None;
  }
  Some(Some(Address {
    street_line1: street_line1?,
    street_line2,
    street_line3,
    city: city?,
    state_code,
    zip,
    nation_code,
  }))
}

/// Same shape as [`address`]. The area code and local number together must
/// form a valid 10-digit number.
fn phone(form: &ContactForm, errors: &mut ValidationErrors) -> Option<Option<Phone>> {
  let country_code = present(&form.phone_country_code);
  let area = present(&form.phone_area);
  let number = present(&form.phone_number);
  let extension = present(&form.phone_ext);

  if area.is_none() && number.is_none() {
    if country_code.is_some() || extension.is_some() {
      errors.push("phone_number", "is required when a country code or extension is given");
      return None;
    }
    return Some(None);
  }

  match (area, number) {
    (Some(area), Some(number))
      if area.len() == 3
        && number.len() == 7
        && is_valid_phone(&format!("{area}{number}")) =>
    {
      Some(Some(Phone { country_code, area, number, extension }))
    }
    _ => {
      errors.push(
        "phone_number",
        "area code and number must form a 10-digit phone number",
      );
      None
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Validate submitted notification channels.
///
/// Opting in to text messages (`sms_status = Y`) clears the SMS device
/// before it is checked or stored.
pub fn notifications(
  form: &NotificationForm,
) -> Result<NotificationSettings, ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let external_email = errors
    .optional("external_email", &form.external_email, EMAIL_MAX)
    .and_then(|email| {
      if is_valid_email(&email) {
        Some(email)
      } else {
        errors.push("external_email", "must be a valid email address");
        None
      }
    });
  let primary_phone = errors.phone("primary_phone", &form.primary_phone);
  let alternate_phone = errors.phone("alternate_phone", &form.alternate_phone);
  let sms_status = errors.indicator("sms_status", &form.sms_status);
  let sms_device = match sms_status {
    Some(Indicator::Yes) => None,
    _ => errors.phone("sms_device", &form.sms_device),
  };

  errors.finish(|| NotificationSettings {
    external_email,
    primary_phone,
    alternate_phone,
    sms_status: sms_status.unwrap_or(Indicator::No),
    sms_device,
  })
}

/// Validate the evacuation-assistance flag.
pub fn evacuation(form: &EvacuationForm) -> Result<Indicator, ValidationErrors> {
  let mut errors = ValidationErrors::default();
  let flag = errors.indicator("evacuation_assistance", &form.evacuation_assistance);
  errors.finish(|| flag.unwrap_or(Indicator::No))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_form() -> ContactForm {
    ContactForm {
      priority: Some(1),
      relation: Some("F".into()),
      first_name: Some("George".into()),
      last_name: Some("Heffley".into()),
      ..ContactForm::default()
    }
  }

  fn fields(errors: &ValidationErrors) -> Vec<&'static str> {
    errors.fields().iter().map(|e| e.field).collect()
  }

  // ─── Phone / email ────────────────────────────────────────────────────────

  #[test]
  fn phone_numbers() {
    for good in ["5035552345", "2438574938", "5860385454", "4829304958"] {
      assert!(is_valid_phone(good), "{good}");
    }
    for bad in ["1453456754", "50350350350", "0234523942", "5035035011", "503555234a", ""] {
      assert!(!is_valid_phone(bad), "{bad}");
    }
  }

  #[test]
  fn email_addresses() {
    for good in ["dfsg@pdx.edu", "george@gmail.com", "jeff@yahoo.com", "fluffy_flower@instant.com"] {
      assert!(is_valid_email(good), "{good}");
    }
    for bad in [
      "df.sd@podf@gmail.com",
      "george@gmail",
      "too@many@ampersands@gmail.com",
      "george@mail.gmail.com",
      "no-at-sign.com",
    ] {
      assert!(!is_valid_email(bad), "{bad}");
    }
  }

  #[test]
  fn usernames() {
    for good in ["gheffley", "g_heffley2", "abcdef"] {
      assert!(is_valid_username(good), "{good}");
    }
    for bad in ["abcde", "greg heffley", "gheffley!", "drop--table", ""] {
      assert!(!is_valid_username(bad), "{bad}");
    }
  }

  // ─── Contacts ─────────────────────────────────────────────────────────────

  #[test]
  fn minimal_contact_is_valid() {
    let contact = contact(&valid_form()).unwrap();
    assert_eq!(contact.priority, 1);
    assert_eq!(contact.relation, Some(RelationCode::Friend));
    assert_eq!(contact.name.first_name, "George");
    assert!(contact.address.is_none());
    assert!(contact.phone.is_none());
  }

  #[test]
  fn empty_strings_count_as_absent() {
    let form = ContactForm {
      middle_initial: Some(String::new()),
      street_line1: Some("".into()),
      city: Some("  ".into()),
      phone_ext: Some("".into()),
      ..valid_form()
    };
    let contact = contact(&form).unwrap();
    assert!(contact.name.middle_initial.is_none());
    assert!(contact.address.is_none());
    assert!(contact.phone.is_none());
  }

  #[test]
  fn complete_addresses() {
    let domestic = ContactForm {
      street_line1: Some("1825 SW Broadway".into()),
      city: Some("Portland".into()),
      state_code: Some("OR".into()),
      zip: Some("97201".into()),
      ..valid_form()
    };
    let address = contact(&domestic).unwrap().address.unwrap();
    assert_eq!(address.city, "Portland");
    assert_eq!(address.state_code.as_deref(), Some("OR"));

    let foreign = ContactForm {
      street_line1: Some("10 Downing St".into()),
      city: Some("London".into()),
      nation_code: Some("LUK".into()),
      ..valid_form()
    };
    assert!(contact(&foreign).unwrap().address.is_some());
  }

  #[test]
  fn partial_address_is_rejected() {
    let form = ContactForm { city: Some("Portland".into()), state_code: Some("OR".into()), ..valid_form() };
    let errors = contact(&form).unwrap_err();
    assert_eq!(fields(&errors), ["street_line1", "address"]);
  }

  #[test]
  fn phone_group() {
    let form = ContactForm {
      phone_area: Some("503".into()),
      phone_number: Some("5552345".into()),
      phone_ext: Some("12".into()),
      ..valid_form()
    };
    let phone = contact(&form).unwrap().phone.unwrap();
    assert_eq!(phone.area, "503");
    assert_eq!(phone.extension.as_deref(), Some("12"));

    let bad = ContactForm { phone_area: Some("503".into()), ..valid_form() };
    assert_eq!(fields(&contact(&bad).unwrap_err()), ["phone_number"]);

    let ends_in_11 = ContactForm {
      phone_area: Some("503".into()),
      phone_number: Some("5035011".into()),
      ..valid_form()
    };
    assert!(contact(&ends_in_11).is_err());
  }

  #[test]
  fn all_failures_are_reported_together() {
    let form = ContactForm {
      priority: Some(0),
      relation: Some("Z".into()),
      first_name: None,
      street_line1: Some("1825 SW Broadway".into()),
      phone_area: Some("023".into()),
      phone_number: Some("4523942".into()),
      ..valid_form()
    };
    let errors = contact(&form).unwrap_err();
    assert_eq!(
      fields(&errors),
      ["priority", "relation", "first_name", "city", "address", "phone_number"]
    );
  }

  #[test]
  fn negative_and_oversized_priorities_are_field_errors() {
    let form: ContactForm = serde_json::from_str(
      r#"{"priority": -1, "relation": "S", "first_name": "Ann", "last_name": "Lee"}"#,
    )
    .unwrap();
    let errors = contact(&form).unwrap_err();
    assert_eq!(fields(&errors), ["priority"]);

    let huge = ContactForm { priority: Some(i64::from(u32::MAX) + 1), ..valid_form() };
    assert_eq!(fields(&contact(&huge).unwrap_err()), ["priority"]);
  }

  #[test]
  fn contact_form_deserialises_from_json() {
    let form: ContactForm = serde_json::from_str(
      r#"{"surrogate_id": 7, "priority": 2, "relation": "S", "first_name": "Ann", "last_name": "Lee"}"#,
    )
    .unwrap();
    let contact = contact(&form).unwrap();
    assert_eq!(contact.surrogate_id.map(|id| id.0), Some(7));
    assert_eq!(contact.relation, Some(RelationCode::Spouse));
  }

  // ─── Profile ──────────────────────────────────────────────────────────────

  #[test]
  fn opting_in_to_sms_clears_the_device() {
    let form = NotificationForm {
      sms_status: Some("Y".into()),
      sms_device: Some("not a phone".into()),
      ..NotificationForm::default()
    };
    let settings = notifications(&form).unwrap();
    assert_eq!(settings.sms_status, Indicator::Yes);
    assert_eq!(settings.sms_device, None);
  }

  #[test]
  fn opting_out_keeps_a_valid_device() {
    let form = NotificationForm {
      external_email: Some("george@gmail.com".into()),
      primary_phone: Some("5035552345".into()),
      sms_status: Some("N".into()),
      sms_device: Some("2438574938".into()),
      ..NotificationForm::default()
    };
    let settings = notifications(&form).unwrap();
    assert_eq!(settings.sms_device.as_deref(), Some("2438574938"));
    assert_eq!(settings.external_email.as_deref(), Some("george@gmail.com"));
  }

  #[test]
  fn notification_errors_are_aggregated() {
    let form = NotificationForm {
      external_email: Some("george@gmail".into()),
      alternate_phone: Some("0234523942".into()),
      sms_status: None,
      ..NotificationForm::default()
    };
    let errors = notifications(&form).unwrap_err();
    assert_eq!(fields(&errors), ["external_email", "alternate_phone", "sms_status"]);
  }

  #[test]
  fn evacuation_flag() {
    let yes = EvacuationForm { evacuation_assistance: Some("Y".into()) };
    assert_eq!(evacuation(&yes).unwrap(), Indicator::Yes);

    let bad = EvacuationForm { evacuation_assistance: Some("maybe".into()) };
    assert!(evacuation(&bad).is_err());
    assert!(evacuation(&EvacuationForm::default()).is_err());
  }
}
