//! Emergency profile: evacuation needs and notification channels.
//!
//! At most one profile exists per person. It is created lazily by the first
//! write and never deleted; opting out clears fields instead.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Pidm;

/// A yes/no flag, stored and transmitted as `"Y"` / `"N"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
  #[serde(rename = "Y")]
  Yes,
  #[serde(rename = "N")]
  No,
}

impl Indicator {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Yes => "Y",
      Self::No => "N",
    }
  }

  pub fn is_yes(self) -> bool { matches!(self, Self::Yes) }
}

impl fmt::Display for Indicator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returned when a string is neither `"Y"` nor `"N"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIndicator(pub String);

impl fmt::Display for InvalidIndicator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "expected \"Y\" or \"N\", got {:?}", self.0)
  }
}

impl std::error::Error for InvalidIndicator {}

impl FromStr for Indicator {
  type Err = InvalidIndicator;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Y" => Ok(Self::Yes),
      "N" => Ok(Self::No),
      other => Err(InvalidIndicator(other.to_owned())),
    }
  }
}

/// The stored profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub pidm:                  Pidm,
  /// Whether the person needs help evacuating a building.
  pub evacuation_assistance: Option<Indicator>,
  pub external_email:        Option<String>,
  /// Copied from the directory when the profile is created; read-only.
  pub campus_email:          Option<String>,
  /// Voice-call number.
  pub primary_phone:         Option<String>,
  pub alternate_phone:       Option<String>,
  /// Text-message opt-in status.
  pub sms_status:            Option<Indicator>,
  /// Always `None` while `sms_status` is `Y`.
  pub sms_device:            Option<String>,
  pub activity_date:         DateTime<Utc>,
}

/// Validated notification channels, written as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
  pub external_email:  Option<String>,
  pub primary_phone:   Option<String>,
  pub alternate_phone: Option<String>,
  pub sms_status:      Indicator,
  pub sms_device:      Option<String>,
}

/// Raw notification fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationForm {
  pub external_email:  Option<String>,
  pub primary_phone:   Option<String>,
  pub alternate_phone: Option<String>,
  pub sms_status:      Option<String>,
  pub sms_device:      Option<String>,
}

/// Raw evacuation-assistance field as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvacuationForm {
  pub evacuation_assistance: Option<String>,
}
