//! The person record resolved at login time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable person identifier shared by identities, contacts, and profiles.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pidm(pub i64);

impl fmt::Display for Pidm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A person known to the university directory. Read-only from this
/// service's point of view; the directory feed owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub pidm:           Pidm,
  pub username:       String,
  /// Campus email address.
  pub email:          Option<String>,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub middle_initial: Option<String>,
}
