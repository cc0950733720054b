//! Emergency contacts: entries in a person's priority-ordered list.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::identity::Pidm;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Stable identifier of one contact row, independent of its priority.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurrogateId(pub i64);

impl fmt::Display for SurrogateId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Relation ────────────────────────────────────────────────────────────────

/// How a contact is related to the person who listed them. Serialised as
/// the single-letter registrar code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum RelationCode {
  #[serde(rename = "G")]
  #[strum(serialize = "G")]
  Guardian,
  #[serde(rename = "F")]
  #[strum(serialize = "F")]
  Friend,
  #[serde(rename = "O")]
  #[strum(serialize = "O")]
  Other,
  #[serde(rename = "U")]
  #[strum(serialize = "U")]
  Uncle,
  #[serde(rename = "S")]
  #[strum(serialize = "S")]
  Spouse,
  #[serde(rename = "A")]
  #[strum(serialize = "A")]
  Aunt,
  #[serde(rename = "R")]
  #[strum(serialize = "R")]
  Relative,
}

impl RelationCode {
  /// The single-letter code stored in the database.
  pub fn code(self) -> &'static str { self.into() }

  pub fn description(self) -> &'static str {
    match self {
      Self::Guardian => "Guardian",
      Self::Friend => "Friend",
      Self::Other => "Other",
      Self::Uncle => "Uncle",
      Self::Spouse => "Spouse",
      Self::Aunt => "Aunt",
      Self::Relative => "Relative",
    }
  }
}

// ─── Field groups ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactName {
  pub first_name:     String,
  pub last_name:      String,
  pub middle_initial: Option<String>,
}

/// A postal address. The type itself carries the completeness rule: street
/// and city are always present, and either a nation or a state + zip pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street_line1: String,
  pub street_line2: Option<String>,
  pub street_line3: Option<String>,
  pub city:         String,
  pub state_code:   Option<String>,
  pub zip:          Option<String>,
  pub nation_code:  Option<String>,
}

/// A North American phone number split the way the registrar stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
  pub country_code: Option<String>,
  /// Three-digit area code.
  pub area:         String,
  /// Seven-digit local number.
  pub number:       String,
  pub extension:    Option<String>,
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub surrogate_id:  SurrogateId,
  /// The person who owns this entry.
  pub pidm:          Pidm,
  /// 1-based rank; an owner's priorities are always exactly `1..=N`.
  pub priority:      u32,
  pub relation:      Option<RelationCode>,
  #[serde(flatten)]
  pub name:          ContactName,
  pub address:       Option<Address>,
  pub phone:         Option<Phone>,
  /// Server-assigned timestamp of the last write.
  pub activity_date: DateTime<Utc>,
}

/// Validated input to [`crate::store::EmergencyStore::upsert_contact`].
///
/// Produced by [`crate::validate::contact`]; the owner comes from the
/// caller's token, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  /// `Some` to update (or create with a caller-chosen id), `None` to let the
  /// store assign one.
  pub surrogate_id: Option<SurrogateId>,
  pub priority:     u32,
  pub relation:     Option<RelationCode>,
  pub name:         ContactName,
  pub address:      Option<Address>,
  pub phone:        Option<Phone>,
}

/// Whether an upsert created a new contact or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Created,
  Updated,
}

// ─── Wire form ───────────────────────────────────────────────────────────────

/// Raw contact fields as submitted by a client. Every field is optional and
/// empty strings count as absent; [`crate::validate::contact`] turns this
/// into a [`NewContact`] or a list of field errors.
///
/// `priority` is signed so that out-of-range numbers reach validation
/// instead of failing deserialisation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
  pub surrogate_id:       Option<SurrogateId>,
  pub priority:           Option<i64>,
  pub relation:           Option<String>,
  pub first_name:         Option<String>,
  pub last_name:          Option<String>,
  pub middle_initial:     Option<String>,
  pub street_line1:       Option<String>,
  pub street_line2:       Option<String>,
  pub street_line3:       Option<String>,
  pub city:               Option<String>,
  pub state_code:         Option<String>,
  pub zip:                Option<String>,
  pub nation_code:        Option<String>,
  pub phone_country_code: Option<String>,
  pub phone_area:         Option<String>,
  pub phone_number:       Option<String>,
  pub phone_ext:          Option<String>,
}
