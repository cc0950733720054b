//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, flags as `'Y'` / `'N'`, and
//! relation codes as their single letter.

use chrono::{DateTime, Utc};
use ember_core::{
  contact::{Address, Contact, ContactName, Phone, RelationCode, SurrogateId},
  identity::{Identity, Pidm},
  profile::{Indicator, Profile},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Indicator ───────────────────────────────────────────────────────────────

pub fn decode_indicator(s: Option<String>) -> Result<Option<Indicator>> {
  s.map(|s| s.parse().map_err(|e| Error::Decode(format!("{e}"))))
    .transpose()
}

// ─── RelationCode ────────────────────────────────────────────────────────────

pub fn decode_relation(s: Option<String>) -> Result<Option<RelationCode>> {
  s.map(|s| {
    s.parse()
      .map_err(|_| Error::Decode(format!("unknown relation code: {s:?}")))
  })
  .transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "
  surrogate_id, pidm, priority, relation,
  first_name, last_name, middle_initial,
  street_line1, street_line2, street_line3, city, state_code, zip, nation_code,
  phone_country_code, phone_area, phone_number, phone_ext,
  activity_date";

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub surrogate_id:       i64,
  pub pidm:               i64,
  pub priority:           u32,
  pub relation:           Option<String>,
  pub first_name:         String,
  pub last_name:          String,
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
  pub activity_date:      String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      surrogate_id:       row.get(0)?,
      pidm:               row.get(1)?,
      priority:           row.get(2)?,
      relation:           row.get(3)?,
      first_name:         row.get(4)?,
      last_name:          row.get(5)?,
      middle_initial:     row.get(6)?,
      street_line1:       row.get(7)?,
      street_line2:       row.get(8)?,
      street_line3:       row.get(9)?,
      city:               row.get(10)?,
      state_code:         row.get(11)?,
      zip:                row.get(12)?,
      nation_code:        row.get(13)?,
      phone_country_code: row.get(14)?,
      phone_area:         row.get(15)?,
      phone_number:       row.get(16)?,
      phone_ext:          row.get(17)?,
      activity_date:      row.get(18)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    // Address and phone are written as whole groups, so the anchor columns
    // decide whether the group exists.
    let address = match (self.street_line1, self.city) {
      (Some(street_line1), Some(city)) => Some(Address {
        street_line1,
        street_line2: self.street_line2,
        street_line3: self.street_line3,
        city,
        state_code: self.state_code,
        zip: self.zip,
        nation_code: self.nation_code,
      }),
      _ => None,
    };
    let phone = match (self.phone_area, self.phone_number) {
      (Some(area), Some(number)) => Some(Phone {
        country_code: self.phone_country_code,
        area,
        number,
        extension: self.phone_ext,
      }),
      _ => None,
    };

    Ok(Contact {
      surrogate_id: SurrogateId(self.surrogate_id),
      pidm: Pidm(self.pidm),
      priority: self.priority,
      relation: decode_relation(self.relation)?,
      name: ContactName {
        first_name:     self.first_name,
        last_name:      self.last_name,
        middle_initial: self.middle_initial,
      },
      address,
      phone,
      activity_date: decode_dt(&self.activity_date)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str = "
  pidm, evacuation_assistance, external_email, campus_email,
  primary_phone, alternate_phone, sms_status, sms_device, activity_date";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub pidm:                  i64,
  pub evacuation_assistance: Option<String>,
  pub external_email:        Option<String>,
  pub campus_email:          Option<String>,
  pub primary_phone:         Option<String>,
  pub alternate_phone:       Option<String>,
  pub sms_status:            Option<String>,
  pub sms_device:            Option<String>,
  pub activity_date:         String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pidm:                  row.get(0)?,
      evacuation_assistance: row.get(1)?,
      external_email:        row.get(2)?,
      campus_email:          row.get(3)?,
      primary_phone:         row.get(4)?,
      alternate_phone:       row.get(5)?,
      sms_status:            row.get(6)?,
      sms_device:            row.get(7)?,
      activity_date:         row.get(8)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      pidm:                  Pidm(self.pidm),
      evacuation_assistance: decode_indicator(self.evacuation_assistance)?,
      external_email:        self.external_email,
      campus_email:          self.campus_email,
      primary_phone:         self.primary_phone,
      alternate_phone:       self.alternate_phone,
      sms_status:            decode_indicator(self.sms_status)?,
      sms_device:            self.sms_device,
      activity_date:         decode_dt(&self.activity_date)?,
    })
  }
}

pub const IDENTITY_COLUMNS: &str =
  "pidm, username, email, first_name, last_name, middle_initial";

pub fn identity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Identity> {
  Ok(Identity {
    pidm:           Pidm(row.get(0)?),
    username:       row.get(1)?,
    email:          row.get(2)?,
    first_name:     row.get(3)?,
    last_name:      row.get(4)?,
    middle_initial: row.get(5)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_round_trip_through_text() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
    assert!(decode_dt("yesterday").is_err());
  }

  #[test]
  fn unknown_codes_are_decode_errors() {
    assert!(matches!(decode_indicator(Some("X".into())), Err(Error::Decode(_))));
    assert!(matches!(decode_relation(Some("Q".into())), Err(Error::Decode(_))));
    assert_eq!(decode_relation(None).unwrap(), None);
    assert_eq!(
      decode_relation(Some("A".into())).unwrap(),
      Some(RelationCode::Aunt)
    );
  }
}
